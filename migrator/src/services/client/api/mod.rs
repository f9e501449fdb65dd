//! API operations module for the content repository
//!
//! This module contains the HTTP operation implementations:
//! - Query operations (parameterised GROQ queries)
//! - Document operations (lookup, create-if-not-exists)
//! - Asset operations (download stream, upload)

pub mod query;
pub use query::*;

pub mod documents;
pub use documents::*;

pub mod assets;
pub use assets::*;
