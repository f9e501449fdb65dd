//! Record migration: traversal, asset rehosting, transformation and writes

pub mod cursor;
pub mod driver;
pub mod progress;
pub mod transform;
pub mod types;


pub use cursor::RecordCursor;
pub use driver::MigrationDriver;
pub use transform::{flatten, strip_null_fields};
pub use types::*;
