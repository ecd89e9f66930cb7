//! Differential updater and transaction coordinator.
//!
//! # Responsibility
//! - Walk sections in fixed order and rows in snapshot order.
//! - Resolve each row's `(ID, Tag)` key and diff it against the live record.
//! - Apply changed columns inside one immediate transaction.
//!
//! # Invariants
//! - Any error rolls back every write issued in the pass.
//! - Rows with an empty diff are matched but never written.
//! - Each write touches exactly one record and only its changed columns.

use super::diff::{diff_fields, FieldChange};
use crate::db::DbError;
use crate::error::{SyncError, SyncResult};
use crate::model::instrument::InstrumentKey;
use crate::model::value::FieldValue;
use crate::repo::instrument_repo::{InstrumentRepository, SqliteInstrumentRepository};
use crate::schema::{Category, Column};
use crate::snapshot::{Snapshot, SnapshotError};
use log::{debug, error, info, warn};
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use std::time::Instant;

/// Changes applied (or planned) for one snapshot row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowChange {
    pub section: Category,
    pub row: usize,
    pub key: InstrumentKey,
    pub changes: Vec<FieldChange>,
}

/// Outcome of an update or dry-run pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateReport {
    /// Snapshot rows matched to a live record.
    pub rows_matched: usize,
    /// Rows with a non-empty diff, in processing order.
    pub rows: Vec<RowChange>,
    /// `true` when produced by [`plan_update`]; nothing was written.
    pub dry_run: bool,
}

impl UpdateReport {
    /// Number of rows with at least one changed field.
    pub fn modified_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of individual field changes across all rows.
    pub fn field_count(&self) -> usize {
        self.rows.iter().map(|row| row.changes.len()).sum()
    }
}

/// Applies a validated snapshot to the store as one atomic unit.
///
/// # Side effects
/// - Opens an immediate transaction; commits only if every row succeeds.
/// - Emits `sync_apply` events with counts, duration and rollback status.
///
/// # Errors
/// - `SchemaMissing` when the `Instruments` table or a column is absent.
/// - `UnknownKey` for the first row whose key has no live record.
/// - `WriteFailure` when an update, commit or transaction start fails.
pub fn apply_update(conn: &mut Connection, snapshot: &Snapshot) -> SyncResult<UpdateReport> {
    let started_at = Instant::now();
    info!(
        "event=sync_apply module=sync status=start rows={}",
        snapshot.row_count()
    );

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|err| SyncError::WriteFailure {
            section: None,
            row: None,
            source: DbError::Sqlite(err),
        })?;

    let outcome = SqliteInstrumentRepository::try_new(&tx)
        .map_err(SyncError::from)
        .and_then(|repo| reconcile(&repo, snapshot, true));

    match outcome {
        Ok(report) => {
            tx.commit().map_err(|err| SyncError::WriteFailure {
                section: None,
                row: None,
                source: DbError::Sqlite(err),
            })?;
            info!(
                "event=sync_apply module=sync status=ok matched={} modified={} fields={} duration_ms={}",
                report.rows_matched,
                report.modified_count(),
                report.field_count(),
                started_at.elapsed().as_millis()
            );
            Ok(report)
        }
        Err(err) => {
            let rolled_back = match tx.rollback() {
                Ok(()) => true,
                Err(rollback_err) => {
                    // Dropping the transaction still rolls back on the connection.
                    error!(
                        "event=sync_apply module=sync status=error error_code=rollback_failed error={}",
                        rollback_err
                    );
                    false
                }
            };
            warn!(
                "event=sync_apply module=sync status=error error_code={} rolled_back={} duration_ms={} error={}",
                err.kind().code(),
                rolled_back,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Computes the changes `apply_update` would make, without writing.
///
/// Uses the same lookup and diff rules, including `UnknownKey` failures.
pub fn plan_update(conn: &Connection, snapshot: &Snapshot) -> SyncResult<UpdateReport> {
    let started_at = Instant::now();
    let repo = SqliteInstrumentRepository::try_new(conn)?;
    let report = reconcile(&repo, snapshot, false)?;
    info!(
        "event=sync_plan module=sync status=ok matched={} modified={} fields={} duration_ms={}",
        report.rows_matched,
        report.modified_count(),
        report.field_count(),
        started_at.elapsed().as_millis()
    );
    Ok(report)
}

fn reconcile<R: InstrumentRepository>(
    repo: &R,
    snapshot: &Snapshot,
    write: bool,
) -> SyncResult<UpdateReport> {
    let mut report = UpdateReport {
        dry_run: !write,
        ..UpdateReport::default()
    };

    for section in snapshot.sections() {
        for row in &section.rows {
            let key = InstrumentKey::from_row(&row.fields).ok_or_else(|| {
                SnapshotError::InvalidCell {
                    section: section.category,
                    row: row.row_number,
                    column: Column::Id,
                    message: "row has no complete (ID, Tag) key".to_string(),
                }
            })?;

            let live = repo
                .find_by_key(&key)?
                .ok_or_else(|| SyncError::UnknownKey {
                    section: section.category,
                    row: row.row_number,
                    key: key.clone(),
                })?;
            report.rows_matched += 1;

            let changes = diff_fields(&row.fields, &live.fields);
            if changes.is_empty() {
                continue;
            }

            debug!(
                "event=sync_row module=sync status=changed section={} row={} id={} columns={}",
                section.category,
                row.row_number,
                key.id,
                changes
                    .iter()
                    .map(|change| change.column.name())
                    .collect::<Vec<_>>()
                    .join(",")
            );

            if write {
                write_row(repo, section.category, row.row_number, &key, &changes)?;
            }

            report.rows.push(RowChange {
                section: section.category,
                row: row.row_number,
                key,
                changes,
            });
        }
    }

    Ok(report)
}

fn write_row<R: InstrumentRepository>(
    repo: &R,
    section: Category,
    row: usize,
    key: &InstrumentKey,
    changes: &[FieldChange],
) -> SyncResult<()> {
    let failure = |source: DbError| SyncError::WriteFailure {
        section: Some(section),
        row: Some(row),
        source,
    };

    let assignments: Vec<(Column, FieldValue)> = changes
        .iter()
        .map(|change| (change.column, change.after.clone()))
        .collect();
    let affected = repo.update_fields(key, &assignments).map_err(failure)?;
    if affected != 1 {
        return Err(failure(DbError::InvalidData(format!(
            "expected to update one record for {key}, updated {affected}"
        ))));
    }
    Ok(())
}
