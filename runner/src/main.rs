//! Runs one full migration pass.
//!
//! Configuration comes from the environment (and `.env` when present):
//!   SANITY_TOKEN / TOKEN, SANITY_PROJECT_ID, SOURCE_DATASET, DESTINATION_DATASET (required)
//!   MIGRATION_ON_ERROR=fail-fast|continue, MIGRATION_CHECKPOINT_PATH, MIGRATION_ASSETS_DIR, ...
//!
//! Log level follows RUST_LOG (default `info`).

use anyhow::{bail, Context};
use migrator::{MigrationConfig, MigrationDriver};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = MigrationConfig::from_env().context("Invalid migration configuration")?;
    tracing::info!(
        "🔄 Migrating '{}' records from {} ({}) to {} ({})",
        config.pipeline.document_type,
        config.repository.source_dataset,
        config.repository.source_api_version,
        config.repository.destination_dataset,
        config.repository.destination_api_version
    );
    tracing::info!("📁 Scratch assets: {}", config.storage.assets_dir.display());

    let mut driver = MigrationDriver::from_config(&config)
        .await
        .context("Failed to set up migration")?;

    let report = match driver.migrate().await {
        Ok(report) => report,
        Err(err) => {
            tracing::error!("✗ Migration aborted at {}: {}", err.stage(), err);
            return Err(err).context("Migration aborted");
        }
    };

    tracing::info!(
        "✓ {} records seen: {} created, {} already present, {} skipped",
        report.records_seen,
        report.records_created,
        report.records_already_present,
        report.records_skipped
    );
    tracing::info!(
        "📦 {} assets rehosted, {} reused, {} bytes downloaded",
        report.assets_rehosted,
        report.assets_reused,
        report.bytes_downloaded
    );

    if !report.is_success() {
        for failure in &report.failures {
            tracing::error!(
                "✗ {} failed at {}: {}",
                failure.record_id,
                failure.stage,
                failure.error
            );
        }
        bail!("{} records failed to migrate", report.failures.len());
    }

    Ok(())
}
