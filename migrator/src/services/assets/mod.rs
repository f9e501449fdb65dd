//! Asset rehosting
//!
//! - **asset_ref**: source asset identity and local filename derivation
//! - **fetcher**: streams an asset URL into the scratch directory
//! - **rehoster**: uploads a scratch file to the destination asset store
//! - **cache**: optional per-run map of source asset id to rehosted id

pub mod asset_ref;
pub mod cache;
pub mod fetcher;
pub mod rehoster;

pub use asset_ref::AssetRef;
pub use cache::AssetCache;
pub use fetcher::{AssetFetcher, LocalAssetFile};
pub use rehoster::AssetRehoster;
