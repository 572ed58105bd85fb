pub mod layout;
mod process;
mod reader;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use process::*;
pub use reader::{FromLeBytes, MemoryReader, ReadMemory};

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockMemoryBuilder, MockMemoryReader};
