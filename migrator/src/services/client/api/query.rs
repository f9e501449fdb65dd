//! Query API operations
//!
//! All functions take `ContentClient` as first parameter, following the
//! same layout as the document and asset operations.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::services::client::errors::ClientError;
use crate::services::client::types::QueryResponse;
use crate::services::client::ContentClient;

/// Encode a query and its parameters as URL pairs.
///
/// Parameters are passed as `$name=<json>`, so string values keep their quotes.
pub fn query_pairs(query: &str, params: &[(&str, Value)]) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len() + 1);
    pairs.push(("query".to_string(), query.to_string()));
    for (name, value) in params {
        pairs.push((format!("${}", name), value.to_string()));
    }
    pairs
}

/// Execute a query against the client's dataset and decode `result`
#[instrument(skip(client, query, params), fields(dataset = %client.coordinates.dataset), err)]
pub async fn query_impl<T>(
    client: &ContentClient,
    query: &str,
    params: &[(&str, Value)],
) -> Result<T, ClientError>
where
    T: DeserializeOwned,
{
    let query_url = client
        .coordinates
        .endpoint(&format!("data/query/{}", client.coordinates.dataset));

    debug!("Running query against {}", query_url);

    let response = client
        .http_client
        .get(&query_url)
        .bearer_auth(&client.coordinates.token)
        .query(&query_pairs(query, params))
        .send()
        .await
        .map_err(|e| ClientError::NetworkError {
            message: format!("Failed to execute query: {}", e),
        })?;

    if response.status().is_success() {
        let body: QueryResponse<T> =
            response
                .json()
                .await
                .map_err(|e| ClientError::InvalidResponse {
                    expected: "query result envelope".to_string(),
                    got: e.to_string(),
                })?;

        if let Some(ms) = body.ms {
            debug!("Query completed in {}ms", ms);
        }

        Ok(body.result)
    } else {
        let status = response.status().as_u16();
        let error_text = response.text().await.unwrap_or_default();
        error!("Query failed: {}", error_text);
        Err(ClientError::request_failed("query", status, error_text))
    }
}
