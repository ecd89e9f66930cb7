//! Top-level engine error and its stable kind classification.
//!
//! # Invariants
//! - Every error aborts the current operation; there is no partial success.
//! - `ErrorKind::code()` values are stable and safe to log or show to users.

use crate::db::DbError;
use crate::model::instrument::InstrumentKey;
use crate::schema::Category;
use crate::snapshot::SnapshotError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SyncResult<T> = Result<T, SyncError>;

/// Failure of an export, validation or update pass.
#[derive(Debug)]
pub enum SyncError {
    Db(DbError),
    Snapshot(SnapshotError),
    UnknownKey {
        section: Category,
        row: usize,
        key: InstrumentKey,
    },
    WriteFailure {
        section: Option<Category>,
        row: Option<usize>,
        source: DbError,
    },
}

/// Caller-facing error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    StoreUnreachable,
    SchemaMissing,
    SectionMissing,
    HeaderMismatch,
    UnknownKey,
    WriteFailure,
    InvalidSnapshot,
    Store,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::StoreUnreachable => "store_unreachable",
            Self::SchemaMissing => "schema_missing",
            Self::SectionMissing => "section_missing",
            Self::HeaderMismatch => "header_mismatch",
            Self::UnknownKey => "unknown_key",
            Self::WriteFailure => "write_failure",
            Self::InvalidSnapshot => "invalid_snapshot",
            Self::Store => "store_error",
        }
    }
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Db(DbError::Unreachable { .. }) => ErrorKind::StoreUnreachable,
            Self::Db(DbError::SchemaMissing { .. }) => ErrorKind::SchemaMissing,
            Self::Db(DbError::Sqlite(_) | DbError::InvalidData(_)) => ErrorKind::Store,
            Self::Snapshot(SnapshotError::SectionMissing(_)) => ErrorKind::SectionMissing,
            Self::Snapshot(SnapshotError::HeaderMismatch { .. }) => ErrorKind::HeaderMismatch,
            Self::Snapshot(_) => ErrorKind::InvalidSnapshot,
            Self::UnknownKey { .. } => ErrorKind::UnknownKey,
            Self::WriteFailure { .. } => ErrorKind::WriteFailure,
        }
    }
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
            Self::UnknownKey { section, row, key } => write!(
                f,
                "section `{section}` row {row}: no instrument matches {key}"
            ),
            Self::WriteFailure {
                section: Some(section),
                row: Some(row),
                source,
            } => write!(f, "update failed at section `{section}` row {row}: {source}"),
            Self::WriteFailure { source, .. } => write!(f, "update failed: {source}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            Self::UnknownKey { .. } => None,
            Self::WriteFailure { source, .. } => Some(source),
        }
    }
}

impl From<DbError> for SyncError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<SnapshotError> for SyncError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, SyncError};
    use crate::db::DbError;
    use crate::model::instrument::InstrumentKey;
    use crate::schema::Category;
    use crate::snapshot::SnapshotError;

    #[test]
    fn kinds_map_each_failure_class() {
        let missing = SyncError::from(DbError::SchemaMissing {
            table: "Instruments".to_string(),
            column: None,
        });
        assert_eq!(missing.kind(), ErrorKind::SchemaMissing);

        let section = SyncError::from(SnapshotError::SectionMissing(Category::AnalogOutput));
        assert_eq!(section.kind(), ErrorKind::SectionMissing);
        assert!(section.to_string().contains("AnalogOutput"));

        let unknown = SyncError::UnknownKey {
            section: Category::DigitalOutput,
            row: 5,
            key: InstrumentKey::new(99, "XV-9"),
        };
        assert_eq!(unknown.kind().code(), "unknown_key");
        assert!(unknown.to_string().contains("row 5"));
        assert!(unknown.to_string().contains("XV-9"));
    }
}
