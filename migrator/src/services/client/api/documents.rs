//! Document API operations

use serde_json::{Map, Value};
use tracing::{error, info, instrument};

use crate::services::client::errors::ClientError;
use crate::services::client::types::{
    DocumentLookupResponse, Mutation, MutationRequest, MutationResponse, UpsertOutcome,
};
use crate::services::client::ContentClient;

/// Fetch a single document by id, `None` when it does not exist
#[instrument(skip(client), fields(dataset = %client.coordinates.dataset), err)]
pub async fn get_document_impl(
    client: &ContentClient,
    id: &str,
) -> Result<Option<Value>, ClientError> {
    let doc_url = client
        .coordinates
        .endpoint(&format!("data/doc/{}/{}", client.coordinates.dataset, id));

    let response = client
        .http_client
        .get(&doc_url)
        .bearer_auth(&client.coordinates.token)
        .send()
        .await
        .map_err(|e| ClientError::NetworkError {
            message: format!("Failed to look up document {}: {}", id, e),
        })?;

    if response.status().is_success() {
        let lookup: DocumentLookupResponse =
            response
                .json()
                .await
                .map_err(|e| ClientError::InvalidResponse {
                    expected: "document lookup envelope".to_string(),
                    got: e.to_string(),
                })?;
        Ok(lookup.documents.into_iter().next())
    } else if response.status().as_u16() == 404 {
        Ok(None)
    } else {
        let status = response.status().as_u16();
        let error_text = response.text().await.unwrap_or_default();
        error!("Document lookup failed: {}", error_text);
        Err(ClientError::request_failed("get_document", status, error_text))
    }
}

/// Write a document only if no document with its `_id` exists yet
#[instrument(skip(client, document), fields(dataset = %client.coordinates.dataset), err)]
pub async fn create_if_not_exists_impl(
    client: &ContentClient,
    document: Map<String, Value>,
) -> Result<UpsertOutcome, ClientError> {
    let id = document
        .get("_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ClientError::SerializationError {
            message: "createIfNotExists requires a document with an _id".to_string(),
        })?;

    let mutate_url = client
        .coordinates
        .endpoint(&format!("data/mutate/{}", client.coordinates.dataset));

    let request = MutationRequest {
        mutations: vec![Mutation::CreateIfNotExists(document)],
    };

    let response = client
        .http_client
        .post(&mutate_url)
        .bearer_auth(&client.coordinates.token)
        .query(&[("returnIds", "true"), ("returnDocuments", "true")])
        .json(&request)
        .send()
        .await
        .map_err(|e| ClientError::NetworkError {
            message: format!("Failed to write document {}: {}", id, e),
        })?;

    if response.status().is_success() {
        let body: MutationResponse =
            response
                .json()
                .await
                .map_err(|e| ClientError::InvalidResponse {
                    expected: "mutation result envelope".to_string(),
                    got: e.to_string(),
                })?;

        let outcome = UpsertOutcome::from_response(&id, body);
        info!(
            "Document {} written (created: {})",
            outcome.id, outcome.created
        );
        Ok(outcome)
    } else {
        let status = response.status().as_u16();
        let error_text = response.text().await.unwrap_or_default();
        error!("Document write failed: {}", error_text);
        Err(ClientError::request_failed("create_if_not_exists", status, error_text))
    }
}
