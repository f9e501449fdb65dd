//! Record shapes on both sides of the migration

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::services::assets::AssetRef;

/// Document as returned by the source query projection.
///
/// Every nested path is optional; a record that is missing a branch simply
/// produces fewer fields downstream. Fields that are only carried over stay
/// untyped `Value`s so an unusual value never rejects the page it came in.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct SourceRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type", default)]
    pub record_type: String,
    #[serde(rename = "_createdAt", default)]
    pub created_at: Option<Value>,
    #[serde(rename = "_updatedAt", default)]
    pub updated_at: Option<Value>,
    #[serde(rename = "_rev", default)]
    pub revision: Option<Value>,
    #[serde(rename = "orderRank", default)]
    pub order_rank: Option<Value>,
    #[serde(default)]
    pub language: Option<Value>,
    #[serde(default)]
    pub content: Option<RecordContent>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct RecordContent {
    #[serde(default)]
    pub main: Option<MainContent>,
    #[serde(default)]
    pub meta: Option<Value>,
}

/// The `content.main` block that gets promoted to the top level
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct MainContent {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub slug: Option<Value>,
    #[serde(rename = "summaryHeadline", default)]
    pub summary_headline: Option<Value>,
    #[serde(rename = "summaryText", default)]
    pub summary_text: Option<Value>,
    #[serde(rename = "mainImage", default)]
    pub main_image: Option<ImageField>,
    #[serde(default)]
    pub icon: Option<ImageField>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ImageField {
    #[serde(default)]
    pub asset: Option<AssetDocument>,
}

/// Dereferenced asset document (`asset->{...}`)
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct AssetDocument {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "_ref", default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub metadata: Option<AssetMetadata>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct AssetMetadata {
    #[serde(default)]
    pub dimensions: Option<Value>,
    #[serde(default)]
    pub lqip: Option<Value>,
    #[serde(default)]
    pub palette: Option<Value>,
}

impl AssetDocument {
    /// Asset reference for rehosting; requires a fetchable URL and an id
    pub fn asset_ref(&self) -> Option<AssetRef> {
        let url = self.url.as_deref().filter(|url| !url.is_empty())?;
        let source_id = self.id.as_deref().or(self.reference.as_deref())?;
        Some(AssetRef::new(source_id, url))
    }
}

impl SourceRecord {
    pub fn main(&self) -> Option<&MainContent> {
        self.content.as_ref().and_then(|content| content.main.as_ref())
    }

    pub fn meta(&self) -> Option<&Value> {
        self.content.as_ref().and_then(|content| content.meta.as_ref())
    }

    pub fn main_image_ref(&self) -> Option<AssetRef> {
        self.main()
            .and_then(|main| main.main_image.as_ref())
            .and_then(|image| image.asset.as_ref())
            .and_then(AssetDocument::asset_ref)
    }

    pub fn icon_ref(&self) -> Option<AssetRef> {
        self.main()
            .and_then(|main| main.icon.as_ref())
            .and_then(|image| image.asset.as_ref())
            .and_then(AssetDocument::asset_ref)
    }
}

/// `{ "_type": "image", "asset": { "_type": "reference", "_ref": id } }`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ImageValue {
    #[serde(rename = "_type")]
    pub kind: String,
    pub asset: ReferenceValue,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReferenceValue {
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(rename = "_ref")]
    pub reference: String,
}

impl ImageValue {
    pub fn referencing(asset_id: impl Into<String>) -> Self {
        Self {
            kind: "image".to_string(),
            asset: ReferenceValue {
                kind: "reference".to_string(),
                reference: asset_id.into(),
            },
        }
    }
}

/// Flattened destination document.
///
/// Absent values serialize as `null` here; `transform::strip_null_fields`
/// removes them before anything is written.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DestinationRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub record_type: String,
    #[serde(rename = "_createdAt")]
    pub created_at: Option<Value>,
    #[serde(rename = "_updatedAt")]
    pub updated_at: Option<Value>,
    #[serde(rename = "_rev")]
    pub revision: Option<Value>,
    #[serde(rename = "orderRank")]
    pub order_rank: Option<Value>,
    pub title: Option<Value>,
    pub slug: Option<Value>,
    #[serde(rename = "summaryHeadline")]
    pub summary_headline: Option<Value>,
    #[serde(rename = "summaryText")]
    pub summary_text: Option<Value>,
    #[serde(rename = "mainImage")]
    pub main_image: Option<ImageValue>,
    pub icon: Option<ImageValue>,
    pub meta: Option<Value>,
    pub language: Option<Value>,
}

/// Per-record lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Fetched,
    AssetsRehosted,
    NoAssets,
    Transformed,
    Upserted,
    /// Already migrated (checkpoint or destination); nothing written
    Skipped,
    Failed,
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecordState::Fetched => "fetched",
            RecordState::AssetsRehosted => "assets_rehosted",
            RecordState::NoAssets => "no_assets",
            RecordState::Transformed => "transformed",
            RecordState::Upserted => "upserted",
            RecordState::Skipped => "skipped",
            RecordState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Details of a failed record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    pub record_id: String,
    pub stage: String,
    pub error: String,
}

/// Summary of one `migrate()` run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub records_seen: u32,
    /// Newly created in the destination
    pub records_created: u32,
    /// Upsert found an existing document and left it untouched
    pub records_already_present: u32,
    /// Skipped before any asset work (checkpoint or destination lookup)
    pub records_skipped: u32,
    pub assets_rehosted: u32,
    /// Served from the per-run asset cache instead of re-uploading
    pub assets_reused: u32,
    pub bytes_downloaded: u64,
    pub failures: Vec<RecordFailure>,
}

impl MigrationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_record_tolerates_missing_branches() {
        let record: SourceRecord = serde_json::from_value(json!({
            "_id": "r1",
            "_type": "application",
            "content": { "main": { "title": "A", "mainImage": null } }
        }))
        .unwrap();

        assert_eq!(record.main().unwrap().title, Some(json!("A")));
        assert!(record.main_image_ref().is_none());
        assert!(record.icon_ref().is_none());
        assert!(record.meta().is_none());
    }

    #[test]
    fn test_asset_ref_requires_url() {
        let asset = AssetDocument {
            id: Some("image-h1-h2-jpg".to_string()),
            url: None,
            ..Default::default()
        };
        assert!(asset.asset_ref().is_none());

        let asset = AssetDocument {
            id: None,
            url: Some("http://x/1".to_string()),
            reference: Some("image-h1-h2-jpg".to_string()),
            ..Default::default()
        };
        let asset_ref = asset.asset_ref().unwrap();
        assert_eq!(asset_ref.source_id, "image-h1-h2-jpg");
        assert_eq!(asset_ref.url, "http://x/1");
    }

    #[test]
    fn test_asset_metadata_parses() {
        let record: SourceRecord = serde_json::from_value(json!({
            "_id": "r1",
            "_type": "application",
            "content": { "main": { "icon": { "asset": {
                "_id": "image-a-b-png",
                "url": "http://x/icon.png",
                "metadata": {
                    "dimensions": { "width": 64, "height": 64 },
                    "lqip": "data:image/png;base64,AAAA",
                    "palette": { "dominant": { "background": "#fff" } }
                }
            } } } }
        }))
        .unwrap();

        let icon = record.main().unwrap().icon.as_ref().unwrap();
        let metadata = icon.asset.as_ref().unwrap().metadata.as_ref().unwrap();
        assert_eq!(metadata.lqip, Some(json!("data:image/png;base64,AAAA")));
        assert_eq!(record.icon_ref().unwrap().source_id, "image-a-b-png");
    }

    #[test]
    fn test_image_value_shape() {
        assert_eq!(
            serde_json::to_value(ImageValue::referencing("X")).unwrap(),
            json!({ "_type": "image", "asset": { "_type": "reference", "_ref": "X" } })
        );
    }

    #[test]
    fn test_unusual_carried_values_do_not_reject_the_page() {
        let page: Vec<SourceRecord> = serde_json::from_value(json!([
            { "_id": "r1", "_type": "application", "orderRank": "0|a:" },
            {
                "_id": "r2",
                "_type": "application",
                "_rev": 7,
                "orderRank": 3,
                "language": { "code": "de" },
                "content": { "main": { "gallery": "not-a-list" } }
            }
        ]))
        .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].order_rank, Some(json!("0|a:")));
        assert_eq!(page[1].order_rank, Some(json!(3)));
        assert_eq!(page[1].language, Some(json!({ "code": "de" })));
    }
}
