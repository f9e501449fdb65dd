use bytes::Bytes;
use futures::stream::BoxStream;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::instrument;

use super::errors::{ClientError, ClientResult};
use super::types::*;

/// Client for one dataset of a content repository
#[derive(Clone, Debug)]
pub struct ContentClient {
    pub(crate) http_client: Client,
    pub(crate) coordinates: RepositoryCoordinates,
}

impl ContentClient {
    /// Create a new client. `timeout` of `None` leaves requests unbounded.
    pub fn new(coordinates: RepositoryCoordinates, timeout: Option<Duration>) -> ClientResult<Self> {
        let mut builder = Client::builder().user_agent("content-migrator/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| ClientError::ConfigurationError {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            coordinates,
        })
    }

    pub fn coordinates(&self) -> &RepositoryCoordinates {
        &self.coordinates
    }

    /// Run a parameterised query and decode its `result`
    pub async fn query<T>(&self, query: &str, params: &[(&str, Value)]) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        crate::services::client::api::query_impl(self, query, params).await
    }

    /// Look up a document by id
    #[instrument(skip(self), err)]
    pub async fn get_document(&self, id: &str) -> ClientResult<Option<Value>> {
        crate::services::client::api::get_document_impl(self, id).await
    }

    /// Create the document unless one with the same `_id` already exists
    #[instrument(skip(self, document), err)]
    pub async fn create_if_not_exists(
        &self,
        document: Map<String, Value>,
    ) -> ClientResult<UpsertOutcome> {
        crate::services::client::api::create_if_not_exists_impl(self, document).await
    }

    /// Open a streaming download of an asset URL
    pub async fn download_asset_stream(
        &self,
        url: &str,
    ) -> ClientResult<BoxStream<'static, ClientResult<Bytes>>> {
        crate::services::client::api::download_stream_impl(self, url).await
    }

    /// Upload asset bytes into this dataset's asset store
    #[instrument(skip(self, data), err)]
    pub async fn upload_asset(
        &self,
        kind: AssetKind,
        data: Vec<u8>,
        filename: &str,
    ) -> ClientResult<UploadedAsset> {
        crate::services::client::api::upload_asset_impl(self, kind, data, filename).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_keeps_coordinates() {
        let coords = RepositoryCoordinates::new("proj", "staging", "2024-08-26", "token");
        let client = ContentClient::new(coords.clone(), Some(Duration::from_secs(30))).unwrap();
        assert_eq!(client.coordinates(), &coords);
    }
}
