//! Differential synchronization engine for the `Instruments` table.
//!
//! Exports eligible I/O points into a four-section workbook and applies an
//! edited workbook back as a minimal, all-or-nothing set of field updates.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schema;
pub mod service;
pub mod snapshot;
pub mod sync;

pub use config::SyncConfig;
pub use error::{ErrorKind, SyncError, SyncResult};
pub use logging::{default_log_level, init_logging, LoggingError};
pub use model::instrument::{CategoryFlags, InstrumentKey, InstrumentRecord};
pub use model::value::{FieldRow, FieldValue};
pub use repo::instrument_repo::{InstrumentRepository, SqliteInstrumentRepository};
pub use schema::{AlarmField, AlarmKind, Category, Column};
pub use service::sync_service::{
    export_instruments, import_instruments, inspect_store, preview_import, StoreOverview,
};
pub use snapshot::{
    export_snapshot, read_snapshot, validate_sheets, ExportSummary, ExportedSnapshot, Snapshot,
    SnapshotError,
};
pub use sync::{apply_update, diff_fields, plan_update, FieldChange, RowChange, UpdateReport};

/// Returns the engine crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
