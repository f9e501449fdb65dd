//! Progress tracking for record migration

pub mod events;

pub use events::{LoggingEventHandler, MigrationEvent, MigrationEventHandler};

#[cfg(test)]
pub use events::RecordingEventHandler;
