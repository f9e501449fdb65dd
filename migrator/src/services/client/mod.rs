// Content repository client
//
// This module provides the HTTP client for the content API:
// - Parameterised queries against a dataset
// - Document lookup and create-if-not-exists writes
// - Asset download streams and uploads

pub mod api;
pub mod content_client;
pub mod errors;
pub mod types;

pub use types::{
    AssetKind,
    AssetUploadResponse,
    DocumentLookupResponse,
    Mutation,
    MutationRequest,
    MutationResponse,
    MutationResultEntry,
    QueryResponse,
    RepositoryCoordinates,
    UploadedAsset,
    UpsertOutcome,
};

pub use content_client::ContentClient;
pub use errors::{ClientError, ClientResult};
