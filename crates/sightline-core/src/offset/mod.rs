mod document;
mod schema;

pub use document::*;
pub use schema::*;
