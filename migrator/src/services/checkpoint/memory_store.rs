use async_trait::async_trait;
use std::collections::BTreeSet;
use tokio::sync::Mutex;

use super::CheckpointStore;
use crate::services::errors::MigrationResult;

/// Checkpoint kept for the lifetime of the process only
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    ids: Mutex<BTreeSet<String>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: Mutex::new(ids.into_iter().map(Into::into).collect()),
        }
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn contains(&self, record_id: &str) -> MigrationResult<bool> {
        Ok(self.ids.lock().await.contains(record_id))
    }

    async fn record(&self, record_id: &str) -> MigrationResult<()> {
        self.ids.lock().await.insert(record_id.to_string());
        Ok(())
    }

    async fn migrated_ids(&self) -> MigrationResult<Vec<String>> {
        Ok(self.ids.lock().await.iter().cloned().collect())
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_and_contains() {
        let store = MemoryCheckpointStore::with_ids(["b"]);
        assert!(store.contains("b").await.unwrap());
        assert!(!store.contains("a").await.unwrap());

        store.record("a").await.unwrap();
        assert_eq!(store.migrated_ids().await.unwrap(), vec!["a", "b"]);
    }
}
