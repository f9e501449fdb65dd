//! Core traits for reading from the source and writing to the destination

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde_json::{Map, Value};

use crate::migration::types::SourceRecord;
use crate::services::client::{AssetKind, ClientResult, UpsertOutcome};

/// Body of an asset download, chunk by chunk
pub type ByteStream = BoxStream<'static, ClientResult<Bytes>>;

/// Paged read access to source records, ordered by id
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Up to `limit` records with an id strictly greater than `after`
    async fn fetch_page(&self, after: Option<&str>, limit: usize)
        -> ClientResult<Vec<SourceRecord>>;
}

/// Create-if-absent document writes
#[async_trait]
pub trait RecordTarget: Send + Sync {
    async fn document_exists(&self, id: &str) -> ClientResult<bool>;

    /// Write `document` unless its `_id` already exists; never overwrites
    async fn create_if_not_exists(&self, document: Map<String, Value>)
        -> ClientResult<UpsertOutcome>;
}

/// Where asset bytes are downloaded from
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn open_stream(&self, url: &str) -> ClientResult<ByteStream>;
}

/// Where asset bytes are uploaded to
#[async_trait]
pub trait AssetTarget: Send + Sync {
    /// Upload and return the destination-minted asset id
    async fn upload_asset(&self, kind: AssetKind, data: Vec<u8>, filename: &str)
        -> ClientResult<String>;
}
