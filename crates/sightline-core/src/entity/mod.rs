mod extract;
mod list;
mod name;
mod snapshot;

pub use extract::*;
pub use list::*;
pub use name::sanitize_name;
pub use snapshot::*;
