//! Categorized, schema-stable snapshot of instrument records.
//!
//! # Responsibility
//! - Hold the four category sections exchanged with editors.
//! - Export records from the store and persist them as an `.xlsx` workbook.
//! - Read an edited workbook back and validate its shape.
//!
//! # Invariants
//! - A `Snapshot` always holds all four sections in `Category::ALL` order.
//! - Every section's rows carry exactly the contract columns.
//! - Row numbers are 1-based worksheet rows (the header is row 1).

use crate::model::value::FieldRow;
use crate::schema::{Category, Column};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod cell;
pub mod export;
pub mod reader;

pub use export::{export_snapshot, ExportSummary, ExportedSnapshot, SectionCount};
pub use reader::{read_snapshot, validate_sheets, RawSheet};

/// One data row of a section.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    /// 1-based worksheet row the values came from (or will be written to).
    pub row_number: usize,
    pub fields: FieldRow,
}

/// All data rows of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub category: Category,
    pub rows: Vec<SnapshotRow>,
}

/// Four-section snapshot, either freshly exported or read and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    sections: Vec<Section>,
}

impl Snapshot {
    /// Creates a snapshot with four empty sections.
    pub fn empty() -> Self {
        Self {
            sections: Category::ALL
                .into_iter()
                .map(|category| Section {
                    category,
                    rows: Vec::new(),
                })
                .collect(),
        }
    }

    /// Sections in fixed category order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, category: Category) -> &Section {
        &self.sections[section_index(category)]
    }

    pub fn section_mut(&mut self, category: Category) -> &mut Section {
        &mut self.sections[section_index(category)]
    }

    /// Appends a row to a section, numbering it after the existing rows.
    pub fn push_row(&mut self, category: Category, fields: FieldRow) {
        let section = self.section_mut(category);
        let row_number = section
            .rows
            .last()
            .map_or(2, |last| last.row_number + 1);
        section.rows.push(SnapshotRow { row_number, fields });
    }

    /// Total data rows across all sections.
    pub fn row_count(&self) -> usize {
        self.sections.iter().map(|section| section.rows.len()).sum()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

fn section_index(category: Category) -> usize {
    match category {
        Category::DigitalInput => 0,
        Category::DigitalOutput => 1,
        Category::AnalogInput => 2,
        Category::AnalogOutput => 3,
    }
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Snapshot file and shape errors.
#[derive(Debug)]
pub enum SnapshotError {
    Read {
        path: PathBuf,
        source: calamine::XlsxError,
    },
    Write(rust_xlsxwriter::XlsxError),
    SectionMissing(Category),
    HeaderMismatch {
        section: Category,
        found: Vec<String>,
    },
    InvalidCell {
        section: Category,
        row: usize,
        column: Column,
        message: String,
    },
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read snapshot `{}`: {source}", path.display())
            }
            Self::Write(err) => write!(f, "cannot write snapshot: {err}"),
            Self::SectionMissing(section) => {
                write!(f, "snapshot is missing required section `{section}`")
            }
            Self::HeaderMismatch { section, found } => write!(
                f,
                "section `{section}` header does not match the expected columns; found [{}]",
                found.join(", ")
            ),
            Self::InvalidCell {
                section,
                row,
                column,
                message,
            } => write!(f, "section `{section}` row {row} column {column}: {message}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Write(err) => Some(err),
            Self::SectionMissing(_) | Self::HeaderMismatch { .. } | Self::InvalidCell { .. } => {
                None
            }
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for SnapshotError {
    fn from(value: rust_xlsxwriter::XlsxError) -> Self {
        Self::Write(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Snapshot;
    use crate::model::value::{FieldRow, FieldValue};
    use crate::schema::{Category, Column};

    #[test]
    fn empty_snapshot_has_four_ordered_sections() {
        let snapshot = Snapshot::empty();
        let order: Vec<Category> = snapshot
            .sections()
            .iter()
            .map(|section| section.category)
            .collect();
        assert_eq!(order, Category::ALL.to_vec());
        assert_eq!(snapshot.row_count(), 0);
    }

    #[test]
    fn push_row_numbers_rows_after_header() {
        let mut snapshot = Snapshot::empty();
        let row = FieldRow::empty().with(Column::Id, FieldValue::Integer(1));
        snapshot.push_row(Category::AnalogOutput, row.clone());
        snapshot.push_row(Category::AnalogOutput, row);

        let rows = &snapshot.section(Category::AnalogOutput).rows;
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[1].row_number, 3);
        assert_eq!(snapshot.row_count(), 2);
    }
}
