//! Checkpoint store abstraction
//!
//! Tracks which record ids have already been migrated so a failed run can be
//! re-executed without redoing finished records.

pub mod file_store;
pub mod memory_store;

use async_trait::async_trait;

use crate::services::errors::MigrationResult;

pub use file_store::{CheckpointScope, FileCheckpointStore};
pub use memory_store::MemoryCheckpointStore;

/// Trait for checkpoint stores keyed by record identifier
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Whether `record_id` has already been migrated
    async fn contains(&self, record_id: &str) -> MigrationResult<bool>;

    /// Mark `record_id` as migrated, durably for persistent stores
    async fn record(&self, record_id: &str) -> MigrationResult<()>;

    /// All migrated ids, sorted
    async fn migrated_ids(&self) -> MigrationResult<Vec<String>>;

    /// Get the name of the storage backend
    fn store_name(&self) -> &'static str;
}
