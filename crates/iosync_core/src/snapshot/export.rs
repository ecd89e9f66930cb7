//! Snapshot exporter: store records to categorized workbook.
//!
//! # Responsibility
//! - Partition eligible records into the four category sections.
//! - Serialize sections to an `.xlsx` workbook honoring the column contract.
//!
//! # Invariants
//! - Read-only against the store.
//! - Each record lands in at most one section (first true flag wins).
//! - Records without any true flag are dropped but counted and logged.

use super::{Snapshot, SnapshotResult};
use crate::db::DbResult;
use crate::model::instrument::InstrumentKey;
use crate::model::value::FieldValue;
use crate::repo::instrument_repo::InstrumentRepository;
use crate::schema::{header_names, Category};
use log::{info, warn};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

/// Rows written to one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionCount {
    pub category: Category,
    pub rows: usize,
}

/// Outcome of one export pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    /// Per-section row counts in fixed category order.
    pub sections: Vec<SectionCount>,
    /// Sum of all section rows.
    pub rows_written: usize,
    /// Eligible records left out because no category flag was true.
    pub unclassified: Vec<InstrumentKey>,
}

/// In-memory export result ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedSnapshot {
    pub snapshot: Snapshot,
    pub summary: ExportSummary,
}

/// Reads all eligible records and partitions them into sections.
///
/// # Side effects
/// - Emits `snapshot_export` events and one `warn` per unclassified record.
pub fn export_snapshot<R: InstrumentRepository>(repo: &R) -> DbResult<ExportedSnapshot> {
    let started_at = Instant::now();
    info!("event=snapshot_export module=snapshot status=start");

    let records = repo.list_eligible()?;
    let mut snapshot = Snapshot::empty();
    let mut unclassified = Vec::new();

    for record in records {
        match record.category() {
            Some(category) => snapshot.push_row(category, record.fields),
            None => {
                // No true flag: excluded from every section.
                if let Some(key) = record.key() {
                    warn!(
                        "event=snapshot_export module=snapshot status=skipped reason=no_category id={} tag={}",
                        key.id, key.tag
                    );
                    unclassified.push(key);
                }
            }
        }
    }

    let sections: Vec<SectionCount> = snapshot
        .sections()
        .iter()
        .map(|section| SectionCount {
            category: section.category,
            rows: section.rows.len(),
        })
        .collect();
    let rows_written = snapshot.row_count();

    info!(
        "event=snapshot_export module=snapshot status=ok rows={} unclassified={} duration_ms={}",
        rows_written,
        unclassified.len(),
        started_at.elapsed().as_millis()
    );

    Ok(ExportedSnapshot {
        snapshot,
        summary: ExportSummary {
            sections,
            rows_written,
            unclassified,
        },
    })
}

impl Snapshot {
    /// Writes the snapshot as a workbook with one worksheet per section.
    ///
    /// Nothing is written to `path` unless the whole workbook serializes.
    pub fn write_xlsx(&self, path: impl AsRef<Path>) -> SnapshotResult<()> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        for section in self.sections() {
            let sheet = workbook.add_worksheet();
            sheet.set_name(section.category.name())?;
            write_header(sheet, &header_format)?;

            for (index, row) in section.rows.iter().enumerate() {
                let sheet_row = u32::try_from(index + 1).unwrap_or(u32::MAX);
                for (column, value) in row.fields.iter() {
                    // Contract has 23 columns; position always fits u16.
                    write_value(sheet, sheet_row, column.position() as u16, value)?;
                }
            }
        }

        workbook.save(path.as_ref())?;
        Ok(())
    }
}

fn write_header(sheet: &mut Worksheet, format: &Format) -> Result<(), XlsxError> {
    for (index, name) in header_names().enumerate() {
        sheet.write_string_with_format(0, index as u16, name, format)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

fn write_value(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &FieldValue,
) -> Result<(), XlsxError> {
    match value {
        FieldValue::Null => {}
        FieldValue::Integer(value) => {
            sheet.write_number(row, col, *value as f64)?;
        }
        FieldValue::Real(value) => {
            sheet.write_number(row, col, *value)?;
        }
        FieldValue::Text(value) => {
            sheet.write_string(row, col, value.as_str())?;
        }
        FieldValue::Bool(value) => {
            sheet.write_boolean(row, col, *value)?;
        }
    }
    Ok(())
}
