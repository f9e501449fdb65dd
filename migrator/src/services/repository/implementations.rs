//! `ContentClient`-backed implementations of the repository traits

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::query::build_page_query;
use super::traits::*;
use crate::migration::types::SourceRecord;
use crate::services::client::{AssetKind, ClientResult, ContentClient, UpsertOutcome};

/// Source dataset, restricted to one document type
#[derive(Clone, Debug)]
pub struct SourceRepository {
    client: ContentClient,
    document_type: String,
}

impl SourceRepository {
    pub fn new(client: ContentClient, document_type: impl Into<String>) -> Self {
        Self {
            client,
            document_type: document_type.into(),
        }
    }
}

#[async_trait]
impl RecordSource for SourceRepository {
    async fn fetch_page(
        &self,
        after: Option<&str>,
        limit: usize,
    ) -> ClientResult<Vec<SourceRecord>> {
        let query = build_page_query(limit);
        let params = [
            ("type", json!(self.document_type)),
            ("after", json!(after.unwrap_or(""))),
        ];
        let records: Vec<SourceRecord> = self.client.query(&query, &params).await?;
        debug!(
            "[SourceRepository] Fetched {} records after {:?}",
            records.len(),
            after
        );
        Ok(records)
    }
}

// Asset URLs are absolute CDN links, so any client can open them
#[async_trait]
impl AssetSource for SourceRepository {
    async fn open_stream(&self, url: &str) -> ClientResult<ByteStream> {
        self.client.download_asset_stream(url).await
    }
}

/// Destination dataset
#[derive(Clone, Debug)]
pub struct DestinationRepository {
    client: ContentClient,
}

impl DestinationRepository {
    pub fn new(client: ContentClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordTarget for DestinationRepository {
    async fn document_exists(&self, id: &str) -> ClientResult<bool> {
        Ok(self.client.get_document(id).await?.is_some())
    }

    async fn create_if_not_exists(
        &self,
        document: Map<String, Value>,
    ) -> ClientResult<UpsertOutcome> {
        self.client.create_if_not_exists(document).await
    }
}

#[async_trait]
impl AssetTarget for DestinationRepository {
    async fn upload_asset(
        &self,
        kind: AssetKind,
        data: Vec<u8>,
        filename: &str,
    ) -> ClientResult<String> {
        let uploaded = self.client.upload_asset(kind, data, filename).await?;
        Ok(uploaded.id)
    }
}
