//! Snapshot reader and validator.
//!
//! # Responsibility
//! - Load category worksheets from an `.xlsx` workbook.
//! - Reject snapshots with missing sections or non-contract headers.
//! - Coerce data cells to canonical values keyed by contract columns.
//!
//! # Invariants
//! - The whole snapshot is rejected on the first shape error; nothing is
//!   partially accepted.
//! - Blank rows are skipped and never treated as data.
//! - Every accepted row carries a complete `(ID, Tag)` key.

use super::cell::{cell_value, header_text, is_blank};
use super::{Snapshot, SnapshotError, SnapshotResult, SnapshotRow};
use crate::model::value::{FieldRow, FieldValue};
use crate::schema::{header_matches, Category, Column};
use calamine::{open_workbook, Data, Reader, Xlsx};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

/// One worksheet as loaded from disk, anchored at cell A1.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    /// Row-major cells; index 0 is worksheet row 1.
    pub rows: Vec<Vec<Data>>,
}

/// Reads and validates a snapshot workbook.
///
/// # Errors
/// - `SnapshotError::Read` when the file cannot be opened or parsed.
/// - Shape errors from [`validate_sheets`].
pub fn read_snapshot(path: impl AsRef<Path>) -> SnapshotResult<Snapshot> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!("event=snapshot_read module=snapshot status=start");

    let result = load_sheets(path).and_then(validate_sheets);
    match &result {
        Ok(snapshot) => info!(
            "event=snapshot_read module=snapshot status=ok rows={} duration_ms={}",
            snapshot.row_count(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event=snapshot_read module=snapshot status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

/// Validates already-loaded worksheets and builds the snapshot.
///
/// Sheets not named after a category are ignored.
pub fn validate_sheets(sheets: Vec<RawSheet>) -> SnapshotResult<Snapshot> {
    let mut by_name: HashMap<String, RawSheet> = sheets
        .into_iter()
        .map(|sheet| (sheet.name.clone(), sheet))
        .collect();

    let mut snapshot = Snapshot::empty();
    for category in Category::ALL {
        let sheet = by_name
            .remove(category.name())
            .ok_or(SnapshotError::SectionMissing(category))?;
        snapshot.section_mut(category).rows = validate_section(category, &sheet)?;
    }

    Ok(snapshot)
}

fn validate_section(category: Category, sheet: &RawSheet) -> SnapshotResult<Vec<SnapshotRow>> {
    let header: Vec<String> = sheet
        .rows
        .first()
        .map(|cells| cells.iter().map(header_text).collect())
        .unwrap_or_default();
    if !header_matches(&header) {
        return Err(SnapshotError::HeaderMismatch {
            section: category,
            found: header,
        });
    }

    let mut rows = Vec::new();
    for (index, cells) in sheet.rows.iter().enumerate().skip(1) {
        if cells.iter().all(is_blank) {
            continue;
        }
        let row_number = index + 1;
        if cells.len() > Column::ALL.len() && !cells[Column::ALL.len()..].iter().all(is_blank) {
            debug!(
                "event=snapshot_read module=snapshot status=ignored_cells section={} row={}",
                category, row_number
            );
        }
        rows.push(SnapshotRow {
            row_number,
            fields: parse_row(category, row_number, cells)?,
        });
    }

    Ok(rows)
}

fn parse_row(category: Category, row_number: usize, cells: &[Data]) -> SnapshotResult<FieldRow> {
    let mut fields = FieldRow::empty();
    for column in Column::ALL {
        let cell = cells.get(column.position()).unwrap_or(&Data::Empty);
        let value = cell_value(column, cell).map_err(|err| SnapshotError::InvalidCell {
            section: category,
            row: row_number,
            column,
            message: err.to_string(),
        })?;
        fields.set(column, value);
    }

    for key_column in [Column::Id, Column::Tag] {
        if fields.get(key_column) == &FieldValue::Null {
            return Err(SnapshotError::InvalidCell {
                section: category,
                row: row_number,
                column: key_column,
                message: "key column is empty".to_string(),
            });
        }
    }

    Ok(fields)
}

fn load_sheets(path: &Path) -> SnapshotResult<Vec<RawSheet>> {
    let read_error = |source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(read_error)?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        if Category::from_name(&name).is_none() {
            continue;
        }
        let range = workbook.worksheet_range(&name).map_err(read_error)?;
        let (start_row, start_col) = range
            .start()
            .map_or((0, 0), |(row, col)| (row as usize, col as usize));

        let mut rows: Vec<Vec<Data>> = vec![Vec::new(); start_row];
        for cells in range.rows() {
            let mut padded = vec![Data::Empty; start_col];
            padded.extend_from_slice(cells);
            rows.push(padded);
        }
        sheets.push(RawSheet { name, rows });
    }

    Ok(sheets)
}
