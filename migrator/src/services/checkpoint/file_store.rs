use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::CheckpointStore;
use crate::services::errors::{MigrationError, MigrationResult};

const CHECKPOINT_VERSION: u32 = 2;

/// Destination and record type a checkpoint was recorded against.
///
/// Ids recorded for one destination say nothing about another, so a
/// checkpoint is only honoured when its scope matches the current run.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointScope {
    pub project_id: String,
    pub destination_dataset: String,
    pub document_type: String,
}

impl CheckpointScope {
    pub fn new(
        project_id: impl Into<String>,
        destination_dataset: impl Into<String>,
        document_type: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            destination_dataset: destination_dataset.into(),
            document_type: document_type.into(),
        }
    }
}

/// On-disk checkpoint format
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CheckpointFile {
    pub version: u32,
    #[serde(default)]
    pub scope: CheckpointScope,
    pub migrated: BTreeSet<String>,
}

/// JSON-file checkpoint, rewritten after every recorded id
#[derive(Debug)]
pub struct FileCheckpointStore {
    path: PathBuf,
    scope: CheckpointScope,
    ids: Mutex<BTreeSet<String>>,
}

impl FileCheckpointStore {
    /// Open the checkpoint at `path` for `scope`.
    ///
    /// Starts empty when the file does not exist or was recorded for another
    /// scope; the old file is replaced on the first recorded id.
    pub async fn open(path: impl Into<PathBuf>, scope: CheckpointScope) -> MigrationResult<Self> {
        let path = path.into();

        let ids = match fs::read(&path).await {
            Ok(raw) => {
                let file: CheckpointFile =
                    serde_json::from_slice(&raw).map_err(|e| checkpoint_error(&path, e))?;
                if file.version != CHECKPOINT_VERSION {
                    return Err(checkpoint_error(
                        &path,
                        format!("unsupported checkpoint version {}", file.version),
                    ));
                }
                if file.scope != scope {
                    warn!(
                        "[Checkpoint] {} was recorded for {:?}, not {:?}; starting fresh",
                        path.display(),
                        file.scope,
                        scope
                    );
                    BTreeSet::new()
                } else {
                    info!(
                        "[Checkpoint] Loaded {} migrated ids from {}",
                        file.migrated.len(),
                        path.display()
                    );
                    file.migrated
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("[Checkpoint] No checkpoint at {}, starting fresh", path.display());
                BTreeSet::new()
            }
            Err(e) => return Err(checkpoint_error(&path, e)),
        };

        Ok(Self {
            path,
            scope,
            ids: Mutex::new(ids),
        })
    }

    // Sibling temp file, then rename over the checkpoint
    async fn persist(&self, ids: &BTreeSet<String>) -> MigrationResult<()> {
        let file = CheckpointFile {
            version: CHECKPOINT_VERSION,
            scope: self.scope.clone(),
            migrated: ids.clone(),
        };
        let body = serde_json::to_vec_pretty(&file).map_err(|e| checkpoint_error(&self.path, e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| checkpoint_error(&self.path, e))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, body)
            .await
            .map_err(|e| checkpoint_error(&self.path, e))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| checkpoint_error(&self.path, e))?;

        debug!("[Checkpoint] Persisted {} ids", ids.len());
        Ok(())
    }
}

fn checkpoint_error(path: &Path, err: impl std::fmt::Display) -> MigrationError {
    MigrationError::Checkpoint {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn contains(&self, record_id: &str) -> MigrationResult<bool> {
        Ok(self.ids.lock().await.contains(record_id))
    }

    async fn record(&self, record_id: &str) -> MigrationResult<()> {
        let mut ids = self.ids.lock().await;
        if ids.insert(record_id.to_string()) {
            self.persist(&ids).await?;
        }
        Ok(())
    }

    async fn migrated_ids(&self) -> MigrationResult<Vec<String>> {
        Ok(self.ids.lock().await.iter().cloned().collect())
    }

    fn store_name(&self) -> &'static str {
        "file"
    }
}
