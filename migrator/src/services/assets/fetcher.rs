use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, instrument};

use crate::services::errors::{MigrationError, MigrationResult};
use crate::services::repository::{AssetSource, ByteStream};

/// Downloaded asset bytes on scratch storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAssetFile {
    pub path: PathBuf,
    pub filename: String,
    pub bytes_written: u64,
}

/// Streams asset URLs into a fixed scratch directory
pub struct AssetFetcher {
    source: Arc<dyn AssetSource>,
    assets_dir: PathBuf,
}

impl AssetFetcher {
    pub fn new(source: Arc<dyn AssetSource>, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            assets_dir: assets_dir.into(),
        }
    }

    /// Download `url` to `{assets_dir}/{filename}`.
    ///
    /// Bytes go to `{filename}.part` first and are renamed into place once the
    /// body stream has ended and the file is flushed. On any failure the
    /// partial file is removed and nothing appears under `filename`.
    #[instrument(skip(self), fields(dir = %self.assets_dir.display()))]
    pub async fn fetch(&self, url: &str, filename: &str) -> MigrationResult<LocalAssetFile> {
        fs::create_dir_all(&self.assets_dir)
            .await
            .map_err(|source| MigrationError::LocalStorage {
                path: self.assets_dir.clone(),
                source,
            })?;

        let path = self.assets_dir.join(filename);
        let part_path = self.assets_dir.join(format!("{}.part", filename));

        let stream = self.source.open_stream(url).await.map_err(|source| {
            error!("[AssetFetcher] Failed to download file from {}: {}", url, source);
            MigrationError::Fetch {
                url: url.to_string(),
                source,
            }
        })?;

        let result = match write_stream(stream, url, &part_path).await {
            Ok(bytes_written) => fs::rename(&part_path, &path)
                .await
                .map(|_| bytes_written)
                .map_err(|source| MigrationError::LocalStorage {
                    path: path.clone(),
                    source,
                }),
            Err(err) => Err(err),
        };

        let bytes_written = match result {
            Ok(bytes_written) => bytes_written,
            Err(err) => {
                error!("[AssetFetcher] Error downloading {}: {}", filename, err);
                let _ = fs::remove_file(&part_path).await;
                return Err(err);
            }
        };

        debug!("[AssetFetcher] Stream ended for {} after {} bytes", url, bytes_written);
        info!("[AssetFetcher] Downloaded {}", filename);

        Ok(LocalAssetFile {
            path,
            filename: filename.to_string(),
            bytes_written,
        })
    }
}

/// Drain `stream` into a new file at `path`; the file is flushed and closed on success
async fn write_stream(mut stream: ByteStream, url: &str, path: &Path) -> MigrationResult<u64> {
    let local_error = |source: std::io::Error| MigrationError::LocalStorage {
        path: path.to_path_buf(),
        source,
    };

    let mut file = fs::File::create(path).await.map_err(local_error)?;
    let mut bytes_written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| MigrationError::Fetch {
            url: url.to_string(),
            source,
        })?;
        file.write_all(&chunk).await.map_err(local_error)?;
        bytes_written += chunk.len() as u64;
    }

    file.flush().await.map_err(local_error)?;
    Ok(bytes_written)
}
