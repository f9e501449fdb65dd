//! Infrastructure Services
//!
//! - **client**: content API client (queries, documents, assets)
//! - **repository**: source/destination traits the driver depends on
//! - **assets**: asset fetching, rehosting and the per-run asset cache
//! - **checkpoint**: record-level checkpoint stores
//! - **config**: environment-driven configuration
//! - **errors**: migration error taxonomy

pub mod assets;
pub mod checkpoint;
pub mod client;
pub mod config;
pub mod errors;
pub mod repository;
