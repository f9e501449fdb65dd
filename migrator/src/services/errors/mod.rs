use std::path::PathBuf;
use thiserror::Error;

use crate::services::client::ClientError;

/// Errors that abort (or, in continue mode, fail) the migration of a record
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Failed to download asset from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: ClientError,
    },

    #[error("Failed to upload asset {filename}: {source}")]
    Upload {
        filename: String,
        #[source]
        source: ClientError,
    },

    #[error("Source query failed: {source}")]
    Query {
        #[source]
        source: ClientError,
    },

    #[error("Failed to write record {record_id}: {source}")]
    Upsert {
        record_id: String,
        #[source]
        source: ClientError,
    },

    #[error("Asset id '{asset_id}' does not follow the <kind>-<hash>-<hash>-<ext> convention")]
    InvalidAssetId { asset_id: String },

    #[error("Scratch storage error at {}: {source}", .path.display())]
    LocalStorage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Checkpoint error at {path}: {message}")]
    Checkpoint { path: String, message: String },

    #[error("Configuration error: {field} - {message}")]
    Configuration { field: String, message: String },
}

impl MigrationError {
    /// Short name of the pipeline stage the error belongs to
    pub fn stage(&self) -> &'static str {
        match self {
            MigrationError::Fetch { .. } => "fetch",
            MigrationError::Upload { .. } => "upload",
            MigrationError::Query { .. } => "query",
            MigrationError::Upsert { .. } => "upsert",
            MigrationError::InvalidAssetId { .. } => "asset_ref",
            MigrationError::LocalStorage { .. } => "scratch",
            MigrationError::Checkpoint { .. } => "checkpoint",
            MigrationError::Configuration { .. } => "configuration",
        }
    }
}

pub type MigrationResult<T> = Result<T, MigrationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_upload_error_carries_filename_and_source() {
        let err = MigrationError::Upload {
            filename: "h1-h2.jpg".to_string(),
            source: ClientError::request_failed("upload_asset", 500, "boom"),
        };
        assert!(err.to_string().contains("h1-h2.jpg"));
        assert!(err.source().is_some());
        assert_eq!(err.stage(), "upload");
    }

    #[test]
    fn test_fetch_error_carries_url() {
        let err = MigrationError::Fetch {
            url: "http://x/1".to_string(),
            source: ClientError::NetworkError {
                message: "connection reset".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Failed to download asset from http://x/1: Network error: connection reset"
        );
    }
}
