use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Connection parameters for one dataset of a content repository
#[derive(Clone, PartialEq, Eq)]
pub struct RepositoryCoordinates {
    pub project_id: String,
    pub dataset: String,
    /// API version date, with or without the leading `v`
    pub api_version: String,
    pub token: String,
    /// Overrides the project-derived API host (used for proxies and tests)
    pub api_host: Option<String>,
}

impl RepositoryCoordinates {
    pub fn new(
        project_id: impl Into<String>,
        dataset: impl Into<String>,
        api_version: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
            api_version: api_version.into(),
            token: token.into(),
            api_host: None,
        }
    }

    pub fn with_api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = Some(api_host.into());
        self
    }

    /// Root of the HTTP API, without a trailing slash
    pub fn base_url(&self) -> String {
        match &self.api_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}.api.sanity.io", self.project_id),
        }
    }

    /// Versioned endpoint URL, e.g. `https://p.api.sanity.io/v2024-08-26/data/query/production`
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/v{}/{}",
            self.base_url(),
            self.api_version.trim_start_matches('v'),
            path.trim_start_matches('/')
        )
    }
}

// Keeps the token out of `#[instrument]` spans and error logs
impl fmt::Debug for RepositoryCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryCoordinates")
            .field("project_id", &self.project_id)
            .field("dataset", &self.dataset)
            .field("api_version", &self.api_version)
            .field("token", &"<redacted>")
            .field("api_host", &self.api_host)
            .finish()
    }
}

/// Binary asset flavour, selecting the upload endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Image,
    File,
}

impl AssetKind {
    /// Classify from the first hyphen segment of an asset id (`image-...`, `file-...`)
    pub fn from_asset_id(asset_id: &str) -> Self {
        match asset_id.split('-').next() {
            Some("file") => AssetKind::File,
            _ => AssetKind::Image,
        }
    }

    pub fn endpoint_segment(&self) -> &'static str {
        match self {
            AssetKind::Image => "images",
            AssetKind::File => "files",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Image => write!(f, "image"),
            AssetKind::File => write!(f, "file"),
        }
    }
}

/// Envelope of `data/query` responses
#[derive(Deserialize, Debug, Clone)]
pub struct QueryResponse<T> {
    pub result: T,
    #[serde(default)]
    pub ms: Option<u64>,
}

/// Envelope of `assets/{kind}` upload responses
#[derive(Deserialize, Debug, Clone)]
pub struct AssetUploadResponse {
    pub document: UploadedAsset,
}

/// Asset document minted by the destination
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct UploadedAsset {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "originalFilename", default)]
    pub original_filename: Option<String>,
}

/// Envelope of `data/doc` lookups
#[derive(Deserialize, Debug, Clone, Default)]
pub struct DocumentLookupResponse {
    #[serde(default)]
    pub documents: Vec<Value>,
}

/// Body of `data/mutate` requests
#[derive(Serialize, Debug, Clone)]
pub struct MutationRequest {
    pub mutations: Vec<Mutation>,
}

#[derive(Serialize, Debug, Clone)]
pub enum Mutation {
    #[serde(rename = "createIfNotExists")]
    CreateIfNotExists(Map<String, Value>),
}

/// Envelope of `data/mutate` responses
#[derive(Deserialize, Debug, Clone)]
pub struct MutationResponse {
    #[serde(rename = "transactionId", default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub results: Vec<MutationResultEntry>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MutationResultEntry {
    pub id: String,
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub document: Option<Value>,
}

/// Outcome of a create-if-absent write
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    pub id: String,
    /// `false` when a document with this id already existed and was left untouched
    pub created: bool,
    pub document: Option<Value>,
}

impl UpsertOutcome {
    /// Interpret the first mutation result for `id`
    pub fn from_response(id: &str, response: MutationResponse) -> Self {
        let entry = response.results.into_iter().find(|entry| entry.id == id);
        match entry {
            Some(entry) => Self {
                id: entry.id,
                created: entry.operation.as_deref() == Some("create"),
                document: entry.document,
            },
            None => Self {
                id: id.to_string(),
                created: false,
                document: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_strips_version_prefix() {
        let coords = RepositoryCoordinates::new("abc", "production", "v2022-03-07", "t");
        assert_eq!(
            coords.endpoint("/data/query/production"),
            "https://abc.api.sanity.io/v2022-03-07/data/query/production"
        );

        let coords = RepositoryCoordinates::new("abc", "production", "2024-08-26", "t")
            .with_api_host("http://localhost:9000/");
        assert_eq!(
            coords.endpoint("assets/images/production"),
            "http://localhost:9000/v2024-08-26/assets/images/production"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let coords = RepositoryCoordinates::new("abc", "production", "2024-08-26", "secret-token");
        let rendered = format!("{:?}", coords);
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_asset_kind_from_id() {
        assert_eq!(AssetKind::from_asset_id("image-abc-800x600-png"), AssetKind::Image);
        assert_eq!(AssetKind::from_asset_id("file-abc-pdf"), AssetKind::File);
        assert_eq!(AssetKind::File.endpoint_segment(), "files");
    }

    #[test]
    fn test_mutation_request_shape() {
        let mut doc = Map::new();
        doc.insert("_id".to_string(), json!("r1"));
        let request = MutationRequest {
            mutations: vec![Mutation::CreateIfNotExists(doc)],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "mutations": [ { "createIfNotExists": { "_id": "r1" } } ] })
        );
    }

    #[test]
    fn test_upsert_outcome_from_response() {
        let response: MutationResponse = serde_json::from_value(json!({
            "transactionId": "tx1",
            "results": [ { "id": "r1", "operation": "create", "document": { "_id": "r1" } } ]
        }))
        .unwrap();
        let outcome = UpsertOutcome::from_response("r1", response);
        assert!(outcome.created);
        assert_eq!(outcome.document, Some(json!({ "_id": "r1" })));

        let response: MutationResponse =
            serde_json::from_value(json!({ "transactionId": "tx2", "results": [] })).unwrap();
        let outcome = UpsertOutcome::from_response("r1", response);
        assert!(!outcome.created);
    }
}
