//! Asset API operations

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, error, info, instrument};

use crate::services::client::errors::ClientError;
use crate::services::client::types::{AssetKind, AssetUploadResponse, UploadedAsset};
use crate::services::client::ContentClient;

/// Open a download of `url` and hand back its body as a byte stream.
///
/// Only the status line has been seen when this returns; the caller owns the
/// stream and decides when the transfer is complete.
#[instrument(skip(client), err)]
pub async fn download_stream_impl(
    client: &ContentClient,
    url: &str,
) -> Result<BoxStream<'static, Result<Bytes, ClientError>>, ClientError> {
    let response = client
        .http_client
        .get(url)
        .send()
        .await
        .map_err(|e| ClientError::NetworkError {
            message: format!("Failed to start asset download: {}", e),
        })?;

    if response.status().is_success() {
        debug!(
            "Started asset stream for {}, size: {:?} bytes",
            url,
            response.content_length()
        );
        let stream = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| ClientError::NetworkError {
                message: format!("Stream read error: {}", e),
            })
        });
        Ok(stream.boxed())
    } else {
        let status = response.status().as_u16();
        let error_text = response.text().await.unwrap_or_default();
        error!("Asset download failed: {}", error_text);
        Err(ClientError::request_failed("download_asset", status, error_text))
    }
}

/// Upload raw bytes to the asset store, tagging the original filename
#[instrument(skip(client, data), fields(size = data.len()), err)]
pub async fn upload_asset_impl(
    client: &ContentClient,
    kind: AssetKind,
    data: Vec<u8>,
    filename: &str,
) -> Result<UploadedAsset, ClientError> {
    let upload_url = client.coordinates.endpoint(&format!(
        "assets/{}/{}",
        kind.endpoint_segment(),
        client.coordinates.dataset
    ));

    let response = client
        .http_client
        .post(&upload_url)
        .bearer_auth(&client.coordinates.token)
        .query(&[("filename", filename)])
        .header("Content-Type", "application/octet-stream")
        .header("Content-Length", data.len().to_string())
        .body(data)
        .send()
        .await
        .map_err(|e| ClientError::NetworkError {
            message: format!("Failed to upload asset: {}", e),
        })?;

    if response.status().is_success() {
        let body: AssetUploadResponse =
            response
                .json()
                .await
                .map_err(|e| ClientError::InvalidResponse {
                    expected: "asset upload envelope".to_string(),
                    got: e.to_string(),
                })?;

        info!("Asset {} uploaded as {}", filename, body.document.id);
        Ok(body.document)
    } else {
        let status = response.status().as_u16();
        let error_text = response.text().await.unwrap_or_default();
        error!("Asset upload failed: {}", error_text);
        Err(ClientError::request_failed("upload_asset", status, error_text))
    }
}
