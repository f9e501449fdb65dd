//! Repository seams used by the migration driver
//!
//! The driver only talks to these traits; `implementations` binds them to
//! `ContentClient`, and tests bind them to in-memory fakes.

pub mod implementations;
pub mod query;
pub mod traits;

pub use implementations::{DestinationRepository, SourceRepository};
pub use query::{build_page_query, RECORD_PROJECTION};
pub use traits::*;
