//! Migration progress events and event handling

use tracing::{debug, error, info, warn};

use crate::migration::types::{MigrationReport, RecordState};

/// Events that can occur during migration
#[derive(Debug, Clone, PartialEq)]
pub enum MigrationEvent {
    Started {
        document_type: String,
    },
    RecordState {
        record_id: String,
        state: RecordState,
    },
    AssetRehosted {
        record_id: String,
        source_id: String,
        new_id: String,
        bytes: u64,
    },
    AssetReused {
        record_id: String,
        source_id: String,
        new_id: String,
    },
    RecordFailed {
        record_id: String,
        stage: String,
        error: String,
    },
    Completed {
        report: MigrationReport,
    },
}

/// Event handler for migration events
pub trait MigrationEventHandler: Send + Sync {
    fn handle_event(&self, event: &MigrationEvent);
}

/// Writes every event to the `tracing` subscriber
pub struct LoggingEventHandler;

impl MigrationEventHandler for LoggingEventHandler {
    fn handle_event(&self, event: &MigrationEvent) {
        match event {
            MigrationEvent::Started { document_type } => {
                info!("[Event] 🚀 Migration started for type '{}'", document_type);
            }
            MigrationEvent::RecordState { record_id, state } => {
                debug!(record_id = %record_id, state = %state, "[Event] Record state changed");
            }
            MigrationEvent::AssetRehosted {
                record_id,
                source_id,
                new_id,
                bytes,
            } => {
                info!(
                    "[Event] 📦 Rehosted {} -> {} ({} bytes) for {}",
                    source_id, new_id, bytes, record_id
                );
            }
            MigrationEvent::AssetReused {
                record_id,
                source_id,
                new_id,
            } => {
                debug!(
                    "[Event] ♻️ Reused {} -> {} for {}",
                    source_id, new_id, record_id
                );
            }
            MigrationEvent::RecordFailed {
                record_id,
                stage,
                error,
            } => {
                error!("[Event] ❌ Record {} failed at {}: {}", record_id, stage, error);
            }
            MigrationEvent::Completed { report } => {
                if report.is_success() {
                    info!(
                        "[Event] ✅ Migration complete: {} seen, {} created, {} already present, {} skipped, {} assets rehosted",
                        report.records_seen,
                        report.records_created,
                        report.records_already_present,
                        report.records_skipped,
                        report.assets_rehosted
                    );
                } else {
                    warn!(
                        "[Event] ⚠️ Migration finished with {} failed records",
                        report.failures.len()
                    );
                }
            }
        }
    }
}

/// Keeps every event in memory; used to inspect a run after the fact
#[cfg(test)]
#[derive(Default)]
pub struct RecordingEventHandler {
    events: std::sync::Mutex<Vec<MigrationEvent>>,
}

#[cfg(test)]
impl RecordingEventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MigrationEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// States one record went through, in order
    pub fn states_for(&self, record_id: &str) -> Vec<RecordState> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                MigrationEvent::RecordState {
                    record_id: id,
                    state,
                } if id == record_id => Some(state),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl MigrationEventHandler for RecordingEventHandler {
    fn handle_event(&self, event: &MigrationEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_handler_tracks_states_per_record() {
        let handler = RecordingEventHandler::new();
        for (record_id, state) in [
            ("r1", RecordState::Fetched),
            ("r2", RecordState::Fetched),
            ("r1", RecordState::Skipped),
        ] {
            handler.handle_event(&MigrationEvent::RecordState {
                record_id: record_id.to_string(),
                state,
            });
        }
        LoggingEventHandler.handle_event(&MigrationEvent::Started {
            document_type: "application".to_string(),
        });

        assert_eq!(handler.events().len(), 3);
        assert_eq!(
            handler.states_for("r1"),
            vec![RecordState::Fetched, RecordState::Skipped]
        );
        assert!(handler.states_for("r3").is_empty());
    }
}
