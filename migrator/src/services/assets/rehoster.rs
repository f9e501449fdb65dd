use std::sync::Arc;
use tokio::fs;
use tracing::{error, info, instrument};

use super::fetcher::LocalAssetFile;
use crate::services::client::AssetKind;
use crate::services::errors::{MigrationError, MigrationResult};
use crate::services::repository::AssetTarget;

/// Uploads scratch files into the destination asset store
pub struct AssetRehoster {
    target: Arc<dyn AssetTarget>,
}

impl AssetRehoster {
    pub fn new(target: Arc<dyn AssetTarget>) -> Self {
        Self { target }
    }

    /// Upload `file` and return the destination asset id. No retries.
    #[instrument(skip(self, file), fields(filename = %file.filename))]
    pub async fn upload(&self, file: &LocalAssetFile, kind: AssetKind) -> MigrationResult<String> {
        let data = fs::read(&file.path)
            .await
            .map_err(|source| MigrationError::LocalStorage {
                path: file.path.clone(),
                source,
            })?;

        match self.target.upload_asset(kind, data, &file.filename).await {
            Ok(asset_id) => {
                info!("[AssetRehoster] Uploaded {} as {}", file.filename, asset_id);
                Ok(asset_id)
            }
            Err(source) => {
                error!("[AssetRehoster] Failed to upload file {}: {}", file.filename, source);
                Err(MigrationError::Upload {
                    filename: file.filename.clone(),
                    source,
                })
            }
        }
    }
}
