//! File-path entry points for export, import and inspection.
//!
//! # Responsibility
//! - Open the store and snapshot named by the caller for each invocation.
//! - Chain reader/validator, updater and transaction coordinator.
//!
//! # Invariants
//! - No state survives between calls; every handle is passed explicitly.
//! - Snapshots are validated before the store is opened for writing.
//! - Export and preview paths open the store read-only.
//! - Callers serialize calls against one store; SQLite locking is the only
//!   guard here.

use crate::config::SyncConfig;
use crate::db::{list_tables, open_store, open_store_read_only, preview_table, TablePreview};
use crate::error::SyncResult;
use crate::repo::instrument_repo::SqliteInstrumentRepository;
use crate::snapshot::{export_snapshot, read_snapshot, ExportSummary};
use crate::sync::{apply_update, plan_update, UpdateReport};
use serde::Serialize;
use std::path::Path;

/// Table listing plus an optional preview of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreOverview {
    pub tables: Vec<String>,
    pub preview: Option<TablePreview>,
}

/// Exports eligible instruments from `store` into a workbook at `destination`.
///
/// Returns the export summary; `rows_written` is the total row count.
pub fn export_instruments(
    store: &Path,
    destination: &Path,
    config: &SyncConfig,
) -> SyncResult<ExportSummary> {
    let conn = open_store_read_only(store, config)?;
    let repo = SqliteInstrumentRepository::try_new(&conn)?;
    let exported = export_snapshot(&repo)?;
    exported.snapshot.write_xlsx(destination)?;
    Ok(exported.summary)
}

/// Validates the workbook at `snapshot` and applies it to `store` atomically.
pub fn import_instruments(
    store: &Path,
    snapshot: &Path,
    config: &SyncConfig,
) -> SyncResult<UpdateReport> {
    let snapshot = read_snapshot(snapshot)?;
    let mut conn = open_store(store, config)?;
    apply_update(&mut conn, &snapshot)
}

/// Validates the workbook and reports the changes an import would make.
pub fn preview_import(
    store: &Path,
    snapshot: &Path,
    config: &SyncConfig,
) -> SyncResult<UpdateReport> {
    let snapshot = read_snapshot(snapshot)?;
    let conn = open_store_read_only(store, config)?;
    plan_update(&conn, &snapshot)
}

/// Lists store tables and previews `table`, or the first table when `None`.
pub fn inspect_store(
    store: &Path,
    table: Option<&str>,
    config: &SyncConfig,
) -> SyncResult<StoreOverview> {
    let conn = open_store_read_only(store, config)?;
    let tables = list_tables(&conn)?;
    let target = table.or_else(|| tables.first().map(String::as_str));
    let preview = match target {
        Some(name) => Some(preview_table(&conn, name, config.preview_limit)?),
        None => None,
    };
    Ok(StoreOverview { tables, preview })
}
