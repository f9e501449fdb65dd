use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::services::checkpoint::CheckpointScope;
use crate::services::client::RepositoryCoordinates;
use crate::services::errors::{MigrationError, MigrationResult};

pub const DEFAULT_SOURCE_API_VERSION: &str = "2022-03-07";
pub const DEFAULT_DESTINATION_API_VERSION: &str = "2024-08-26";
pub const DEFAULT_DOCUMENT_TYPE: &str = "application";

#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub repository: RepositoryConfig,
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
    pub assets: AssetConfig,
    pub http: HttpConfig,
}

/// Connection parameters shared by both repositories
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub token: String,
    pub project_id: String,
    pub source_dataset: String,
    pub destination_dataset: String,
    pub source_api_version: String,
    pub destination_api_version: String,
    pub api_host: Option<String>,
}

impl std::fmt::Debug for RepositoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryConfig")
            .field("token", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("source_dataset", &self.source_dataset)
            .field("destination_dataset", &self.destination_dataset)
            .field("source_api_version", &self.source_api_version)
            .field("destination_api_version", &self.destination_api_version)
            .field("api_host", &self.api_host)
            .finish()
    }
}

/// What to do when a record fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Stop the whole run at the first failed record
    #[default]
    FailFast,
    /// Record the failure in the report and move on to the next record
    Continue,
}

impl FromStr for FailureMode {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" | "abort" => Ok(FailureMode::FailFast),
            "continue" | "continue-on-error" | "skip" => Ok(FailureMode::Continue),
            other => Err(MigrationError::Configuration {
                field: "MIGRATION_ON_ERROR".to_string(),
                message: format!("unknown failure mode '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// `_type` of the records to migrate
    pub document_type: String,
    pub page_size: usize,
    pub failure_mode: FailureMode,
    /// Skip records whose id already exists in the destination, without rehosting assets
    pub skip_existing: bool,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Scratch directory for downloaded asset bytes
    pub assets_dir: PathBuf,
    /// Checkpoint file; `None` keeps the checkpoint in memory for this run only
    pub checkpoint_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AssetConfig {
    /// Reuse a rehosted asset id when several records reference the same source asset
    pub dedupe: bool,
    pub cache_capacity: NonZeroUsize,
}

#[derive(Debug, Clone, Default)]
pub struct HttpConfig {
    pub timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            document_type: DEFAULT_DOCUMENT_TYPE.to_string(),
            page_size: 100,
            failure_mode: FailureMode::FailFast,
            skip_existing: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            checkpoint_path: Some(PathBuf::from("migration-checkpoint.json")),
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            dedupe: false, // Original semantics: every record rehosts its own assets
            cache_capacity: NonZeroUsize::new(1024).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl MigrationConfig {
    /// Load configuration from the process environment, reading `.env` first if present
    pub fn from_env() -> MigrationResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> MigrationResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| MigrationError::Configuration {
                field: key.to_string(),
                message: "required but not set".to_string(),
            })
        };

        let token = get("SANITY_TOKEN")
            .or_else(|| get("TOKEN"))
            .ok_or_else(|| MigrationError::Configuration {
                field: "SANITY_TOKEN".to_string(),
                message: "required but not set (TOKEN is also accepted)".to_string(),
            })?;

        let repository = RepositoryConfig {
            token,
            project_id: require("SANITY_PROJECT_ID")?,
            source_dataset: require("SOURCE_DATASET")?,
            destination_dataset: require("DESTINATION_DATASET")?,
            source_api_version: get("SOURCE_API_VERSION")
                .unwrap_or_else(|| DEFAULT_SOURCE_API_VERSION.to_string()),
            destination_api_version: get("DESTINATION_API_VERSION")
                .unwrap_or_else(|| DEFAULT_DESTINATION_API_VERSION.to_string()),
            api_host: get("SANITY_API_HOST"),
        };

        let mut pipeline = PipelineConfig::default();
        if let Some(document_type) = get("MIGRATION_DOCUMENT_TYPE") {
            pipeline.document_type = document_type;
        }
        if let Some(page_size) = get("MIGRATION_PAGE_SIZE") {
            pipeline.page_size = parse_number("MIGRATION_PAGE_SIZE", &page_size)?;
            if pipeline.page_size == 0 {
                return Err(MigrationError::Configuration {
                    field: "MIGRATION_PAGE_SIZE".to_string(),
                    message: "must be at least 1".to_string(),
                });
            }
        }
        if let Some(mode) = get("MIGRATION_ON_ERROR") {
            pipeline.failure_mode = mode.parse()?;
        }
        if let Some(skip) = get("MIGRATION_SKIP_EXISTING") {
            pipeline.skip_existing = parse_flag("MIGRATION_SKIP_EXISTING", &skip)?;
        }

        let mut storage = StorageConfig::default();
        if let Some(dir) = get("MIGRATION_ASSETS_DIR") {
            storage.assets_dir = PathBuf::from(dir);
        }
        // Explicitly empty disables the on-disk checkpoint
        match lookup("MIGRATION_CHECKPOINT_PATH") {
            Some(path) if path.trim().is_empty() => storage.checkpoint_path = None,
            Some(path) => storage.checkpoint_path = Some(PathBuf::from(path)),
            None => {}
        }

        let mut assets = AssetConfig::default();
        if let Some(dedupe) = get("MIGRATION_DEDUPE_ASSETS") {
            assets.dedupe = parse_flag("MIGRATION_DEDUPE_ASSETS", &dedupe)?;
        }
        if let Some(capacity) = get("MIGRATION_ASSET_CACHE_CAPACITY") {
            let capacity: usize = parse_number("MIGRATION_ASSET_CACHE_CAPACITY", &capacity)?;
            assets.cache_capacity =
                NonZeroUsize::new(capacity).ok_or_else(|| MigrationError::Configuration {
                    field: "MIGRATION_ASSET_CACHE_CAPACITY".to_string(),
                    message: "must be at least 1".to_string(),
                })?;
        }

        let mut http = HttpConfig::default();
        if let Some(secs) = get("MIGRATION_HTTP_TIMEOUT_SECS") {
            let secs: u64 = parse_number("MIGRATION_HTTP_TIMEOUT_SECS", &secs)?;
            http.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(Self {
            repository,
            pipeline,
            storage,
            assets,
            http,
        })
    }

    pub fn source_coordinates(&self) -> RepositoryCoordinates {
        self.coordinates(
            &self.repository.source_dataset,
            &self.repository.source_api_version,
        )
    }

    pub fn destination_coordinates(&self) -> RepositoryCoordinates {
        self.coordinates(
            &self.repository.destination_dataset,
            &self.repository.destination_api_version,
        )
    }

    /// What the on-disk checkpoint is keyed to
    pub fn checkpoint_scope(&self) -> CheckpointScope {
        CheckpointScope::new(
            self.repository.project_id.clone(),
            self.repository.destination_dataset.clone(),
            self.pipeline.document_type.clone(),
        )
    }

    fn coordinates(&self, dataset: &str, api_version: &str) -> RepositoryCoordinates {
        let coordinates = RepositoryCoordinates::new(
            self.repository.project_id.clone(),
            dataset,
            api_version,
            self.repository.token.clone(),
        );
        match &self.repository.api_host {
            Some(host) => coordinates.with_api_host(host.clone()),
            None => coordinates,
        }
    }
}

fn parse_number<T: FromStr>(field: &str, value: &str) -> MigrationResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| MigrationError::Configuration {
            field: field.to_string(),
            message: format!("'{}' is not a valid number", value),
        })
}

fn parse_flag(field: &str, value: &str) -> MigrationResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(MigrationError::Configuration {
            field: field.to_string(),
            message: format!("'{}' is not a boolean", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("TOKEN", "sk-test"),
        ("SANITY_PROJECT_ID", "proj"),
        ("SOURCE_DATASET", "v2"),
        ("DESTINATION_DATASET", "v3"),
    ];

    #[test]
    fn test_defaults_from_required_only() {
        let config = MigrationConfig::from_lookup(lookup_from(REQUIRED)).unwrap();

        assert_eq!(config.repository.token, "sk-test");
        assert_eq!(config.repository.source_api_version, "2022-03-07");
        assert_eq!(config.repository.destination_api_version, "2024-08-26");
        assert_eq!(config.pipeline.document_type, "application");
        assert_eq!(config.pipeline.failure_mode, FailureMode::FailFast);
        assert!(config.pipeline.skip_existing);
        assert!(!config.assets.dedupe);
        assert!(config.http.timeout.is_none());
        assert_eq!(config.storage.assets_dir, PathBuf::from("assets"));

        let source = config.source_coordinates();
        assert_eq!(source.dataset, "v2");
        assert_eq!(source.base_url(), "https://proj.api.sanity.io");
        assert_eq!(config.destination_coordinates().dataset, "v3");
    }

    #[test]
    fn test_missing_required_field() {
        let err = MigrationConfig::from_lookup(lookup_from(&[("TOKEN", "t")])).unwrap_err();
        match err {
            MigrationError::Configuration { field, .. } => assert_eq!(field, "SANITY_PROJECT_ID"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend_from_slice(&[
            ("MIGRATION_ON_ERROR", "continue"),
            ("MIGRATION_PAGE_SIZE", "25"),
            ("MIGRATION_SKIP_EXISTING", "false"),
            ("MIGRATION_DEDUPE_ASSETS", "yes"),
            ("MIGRATION_ASSET_CACHE_CAPACITY", "16"),
            ("MIGRATION_HTTP_TIMEOUT_SECS", "30"),
            ("MIGRATION_CHECKPOINT_PATH", ""),
            ("SANITY_API_HOST", "http://localhost:3333"),
        ]);
        let config = MigrationConfig::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.pipeline.failure_mode, FailureMode::Continue);
        assert_eq!(config.pipeline.page_size, 25);
        assert!(!config.pipeline.skip_existing);
        assert!(config.assets.dedupe);
        assert_eq!(config.assets.cache_capacity.get(), 16);
        assert_eq!(config.http.timeout, Some(Duration::from_secs(30)));
        assert!(config.storage.checkpoint_path.is_none());
        assert_eq!(config.checkpoint_scope().document_type, "application");
        assert_eq!(
            config.destination_coordinates().base_url(),
            "http://localhost:3333"
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("MIGRATION_ON_ERROR", "sometimes"));
        assert!(MigrationConfig::from_lookup(lookup_from(&pairs)).is_err());

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("MIGRATION_PAGE_SIZE", "0"));
        assert!(MigrationConfig::from_lookup(lookup_from(&pairs)).is_err());

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("MIGRATION_ASSET_CACHE_CAPACITY", "0"));
        assert!(MigrationConfig::from_lookup(lookup_from(&pairs)).is_err());
    }
}
