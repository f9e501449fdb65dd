//! Record-by-record migration pipeline
//!
//! For every source record, in `_id` order:
//! 1. skip it if the checkpoint (or, with `skip_existing`, the destination) already has it
//! 2. rehost the main image, then the icon
//! 3. flatten the record and create it in the destination if absent
//! 4. record the id in the checkpoint

use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use super::cursor::RecordCursor;
use super::progress::{LoggingEventHandler, MigrationEvent, MigrationEventHandler};
use super::transform::flatten;
use super::types::{MigrationReport, RecordFailure, RecordState, SourceRecord};
use crate::services::assets::{AssetCache, AssetFetcher, AssetRef, AssetRehoster};
use crate::services::checkpoint::{CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
use crate::services::client::{ClientError, ContentClient};
use crate::services::config::{FailureMode, MigrationConfig, PipelineConfig};
use crate::services::errors::{MigrationError, MigrationResult};
use crate::services::repository::{
    AssetSource, AssetTarget, DestinationRepository, RecordSource, RecordTarget, SourceRepository,
};

/// How a single record left the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordOutcome {
    Created,
    AlreadyPresent,
    Skipped,
}

pub struct MigrationDriver {
    source: Arc<dyn RecordSource>,
    target: Arc<dyn RecordTarget>,
    fetcher: AssetFetcher,
    rehoster: AssetRehoster,
    checkpoint: Arc<dyn CheckpointStore>,
    cache: AssetCache,
    events: Arc<dyn MigrationEventHandler>,
    pipeline: PipelineConfig,
}

impl MigrationDriver {
    pub fn new(
        source: Arc<dyn RecordSource>,
        target: Arc<dyn RecordTarget>,
        fetcher: AssetFetcher,
        rehoster: AssetRehoster,
        checkpoint: Arc<dyn CheckpointStore>,
        pipeline: PipelineConfig,
    ) -> Self {
        Self {
            source,
            target,
            fetcher,
            rehoster,
            checkpoint,
            cache: AssetCache::disabled(),
            events: Arc::new(LoggingEventHandler),
            pipeline,
        }
    }

    pub fn with_asset_cache(mut self, cache: AssetCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_event_handler(mut self, events: Arc<dyn MigrationEventHandler>) -> Self {
        self.events = events;
        self
    }

    /// Wire both repositories, scratch storage and the checkpoint from configuration
    pub async fn from_config(config: &MigrationConfig) -> MigrationResult<Self> {
        let source_client = ContentClient::new(config.source_coordinates(), config.http.timeout)
            .map_err(|err| client_setup_error("source", err))?;
        let destination_client =
            ContentClient::new(config.destination_coordinates(), config.http.timeout)
                .map_err(|err| client_setup_error("destination", err))?;

        let source = Arc::new(SourceRepository::new(
            source_client,
            config.pipeline.document_type.clone(),
        ));
        let destination = Arc::new(DestinationRepository::new(destination_client));

        let checkpoint: Arc<dyn CheckpointStore> = match &config.storage.checkpoint_path {
            Some(path) => Arc::new(
                FileCheckpointStore::open(path, config.checkpoint_scope()).await?,
            ),
            None => Arc::new(MemoryCheckpointStore::new()),
        };
        info!(
            "[MigrationDriver] Using {} checkpoint store",
            checkpoint.store_name()
        );

        let cache = if config.assets.dedupe {
            AssetCache::with_capacity(config.assets.cache_capacity)
        } else {
            AssetCache::disabled()
        };

        let asset_source: Arc<dyn AssetSource> = source.clone();
        let asset_target: Arc<dyn AssetTarget> = destination.clone();

        Ok(Self::new(
            source,
            destination,
            AssetFetcher::new(asset_source, config.storage.assets_dir.clone()),
            AssetRehoster::new(asset_target),
            checkpoint,
            config.pipeline.clone(),
        )
        .with_asset_cache(cache))
    }

    /// Run one full pass over the source.
    ///
    /// In fail-fast mode the first failed record aborts the run with its error.
    /// In continue mode failures are collected in the returned report.
    #[instrument(skip(self), fields(document_type = %self.pipeline.document_type))]
    pub async fn migrate(&mut self) -> MigrationResult<MigrationReport> {
        info!(
            "[MigrationDriver] Starting migration (page size {}, {:?}, skip existing: {}, asset dedupe: {})",
            self.pipeline.page_size,
            self.pipeline.failure_mode,
            self.pipeline.skip_existing,
            self.cache.is_enabled()
        );
        self.events.handle_event(&MigrationEvent::Started {
            document_type: self.pipeline.document_type.clone(),
        });

        let mut report = MigrationReport::default();
        let mut cursor = RecordCursor::new(self.source.clone(), self.pipeline.page_size);

        loop {
            let page = match cursor.next_page().await {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(err) => {
                    error!("[MigrationDriver] Source query failed: {}", err);
                    return Err(err);
                }
            };

            for record in page {
                report.records_seen += 1;
                let record_id = record.id.clone();

                match self.process_record(&record, &mut report).await {
                    Ok(RecordOutcome::Created) => report.records_created += 1,
                    Ok(RecordOutcome::AlreadyPresent) => report.records_already_present += 1,
                    Ok(RecordOutcome::Skipped) => report.records_skipped += 1,
                    Err(err) => {
                        error!(
                            "[MigrationDriver] Record {} failed at {}: {}",
                            record_id,
                            err.stage(),
                            err
                        );
                        self.emit_state(&record_id, RecordState::Failed);
                        self.events.handle_event(&MigrationEvent::RecordFailed {
                            record_id: record_id.clone(),
                            stage: err.stage().to_string(),
                            error: err.to_string(),
                        });

                        match self.pipeline.failure_mode {
                            FailureMode::FailFast => return Err(err),
                            FailureMode::Continue => report.failures.push(RecordFailure {
                                record_id,
                                stage: err.stage().to_string(),
                                error: err.to_string(),
                            }),
                        }
                    }
                }
            }
        }

        info!(
            "[MigrationDriver] Finished after {} pages: {} seen, {} created, {} already present, {} skipped, {} failed",
            cursor.pages_fetched(),
            report.records_seen,
            report.records_created,
            report.records_already_present,
            report.records_skipped,
            report.failures.len()
        );
        self.events.handle_event(&MigrationEvent::Completed {
            report: report.clone(),
        });

        Ok(report)
    }

    async fn process_record(
        &mut self,
        record: &SourceRecord,
        report: &mut MigrationReport,
    ) -> MigrationResult<RecordOutcome> {
        let record_id = record.id.as_str();
        self.emit_state(record_id, RecordState::Fetched);

        if self.checkpoint.contains(record_id).await? {
            debug!("[MigrationDriver] {} is in the checkpoint, skipping", record_id);
            self.emit_state(record_id, RecordState::Skipped);
            return Ok(RecordOutcome::Skipped);
        }

        if self.pipeline.skip_existing {
            let exists = self
                .target
                .document_exists(record_id)
                .await
                .map_err(|source| MigrationError::Upsert {
                    record_id: record_id.to_string(),
                    source,
                })?;
            if exists {
                debug!(
                    "[MigrationDriver] {} already exists in the destination, skipping",
                    record_id
                );
                self.checkpoint.record(record_id).await?;
                self.emit_state(record_id, RecordState::Skipped);
                return Ok(RecordOutcome::Skipped);
            }
        }

        // Main image strictly before icon
        let main_image_id = match record.main_image_ref() {
            Some(asset_ref) => Some(self.rehost(record_id, &asset_ref, report).await?),
            None => None,
        };
        let icon_id = match record.icon_ref() {
            Some(asset_ref) => Some(self.rehost(record_id, &asset_ref, report).await?),
            None => None,
        };

        if main_image_id.is_some() || icon_id.is_some() {
            self.emit_state(record_id, RecordState::AssetsRehosted);
        } else {
            self.emit_state(record_id, RecordState::NoAssets);
        }

        let document = flatten(record, main_image_id.as_deref(), icon_id.as_deref())
            .into_document()
            .map_err(|err| MigrationError::Upsert {
                record_id: record_id.to_string(),
                source: ClientError::from(err),
            })?;
        self.emit_state(record_id, RecordState::Transformed);

        let outcome = self
            .target
            .create_if_not_exists(document)
            .await
            .map_err(|source| MigrationError::Upsert {
                record_id: record_id.to_string(),
                source,
            })?;

        self.checkpoint.record(record_id).await?;
        self.emit_state(record_id, RecordState::Upserted);

        if outcome.created {
            info!("[MigrationDriver] ✅ Created {}", record_id);
            Ok(RecordOutcome::Created)
        } else {
            warn!(
                "[MigrationDriver] {} already existed in the destination and was left untouched",
                record_id
            );
            Ok(RecordOutcome::AlreadyPresent)
        }
    }

    /// Download one asset to scratch storage and upload it to the destination
    async fn rehost(
        &mut self,
        record_id: &str,
        asset_ref: &AssetRef,
        report: &mut MigrationReport,
    ) -> MigrationResult<String> {
        if let Some(rehosted_id) = self.cache.get(&asset_ref.source_id) {
            report.assets_reused += 1;
            self.events.handle_event(&MigrationEvent::AssetReused {
                record_id: record_id.to_string(),
                source_id: asset_ref.source_id.clone(),
                new_id: rehosted_id.clone(),
            });
            return Ok(rehosted_id);
        }

        let filename = asset_ref.local_filename()?;
        let file = self.fetcher.fetch(&asset_ref.url, &filename).await?;
        report.bytes_downloaded += file.bytes_written;

        let rehosted_id = self.rehoster.upload(&file, asset_ref.kind()).await?;
        report.assets_rehosted += 1;
        self.cache.insert(&asset_ref.source_id, &rehosted_id);

        self.events.handle_event(&MigrationEvent::AssetRehosted {
            record_id: record_id.to_string(),
            source_id: asset_ref.source_id.clone(),
            new_id: rehosted_id.clone(),
            bytes: file.bytes_written,
        });

        Ok(rehosted_id)
    }

    fn emit_state(&self, record_id: &str, state: RecordState) {
        self.events.handle_event(&MigrationEvent::RecordState {
            record_id: record_id.to_string(),
            state,
        });
    }
}

fn client_setup_error(side: &str, err: ClientError) -> MigrationError {
    MigrationError::Configuration {
        field: format!("{} client", side),
        message: err.to_string(),
    }
}
