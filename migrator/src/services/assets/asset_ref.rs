use crate::services::client::AssetKind;
use crate::services::errors::{MigrationError, MigrationResult};

/// One binary asset within a source record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetRef {
    /// `<kind>-<hash>-<hash2>-<ext>`, e.g. `image-abc123-800x600-png`
    pub source_id: String,
    pub url: String,
}

impl AssetRef {
    pub fn new(source_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            url: url.into(),
        }
    }

    pub fn kind(&self) -> AssetKind {
        AssetKind::from_asset_id(&self.source_id)
    }

    /// Deterministic scratch filename.
    ///
    /// `image-<hash>-<dims>-<ext>` becomes `{hash}-{dims}.{ext}` and
    /// `file-<hash>-<ext>` becomes `{hash}.{ext}`. Segments may only hold
    /// ASCII alphanumerics and `_`, so the name never leaves the scratch dir.
    pub fn local_filename(&self) -> MigrationResult<String> {
        let segments: Vec<&str> = self.source_id.split('-').collect();
        let filename = match (self.kind(), segments.as_slice()) {
            (_, [_, hash, dims, ext, ..]) if all_safe(&[hash, dims, ext]) => {
                Some(format!("{}-{}.{}", hash, dims, ext))
            }
            (AssetKind::File, [_, hash, ext]) if all_safe(&[hash, ext]) => {
                Some(format!("{}.{}", hash, ext))
            }
            _ => None,
        };

        filename.ok_or_else(|| MigrationError::InvalidAssetId {
            asset_id: self.source_id.clone(),
        })
    }
}

fn all_safe(segments: &[&&str]) -> bool {
    segments.iter().all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}
