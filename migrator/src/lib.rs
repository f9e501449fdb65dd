//! Copies records of one type from a source content dataset into a
//! destination dataset, rehosting their image assets on the way.
//!
//! ```no_run
//! # async fn run() -> migrator::MigrationResult<()> {
//! let config = migrator::MigrationConfig::from_env()?;
//! let mut driver = migrator::MigrationDriver::from_config(&config).await?;
//! let report = driver.migrate().await?;
//! println!("{} records created", report.records_created);
//! # Ok(())
//! # }
//! ```

pub mod migration;
pub mod services;

pub use migration::{MigrationDriver, MigrationReport, RecordFailure, RecordState};
pub use services::config::{FailureMode, MigrationConfig};
pub use services::errors::{MigrationError, MigrationResult};
