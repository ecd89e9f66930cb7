//! Live store access: connection bootstrap, schema checks and inspection.
//!
//! # Responsibility
//! - Open existing SQLite store files without ever creating them.
//! - Verify the `Instruments` table carries every column the engine touches.
//! - Offer read-only table listing and previews.
//!
//! # Invariants
//! - A store that cannot be opened or is not a database is `Unreachable`.
//! - Missing tables/columns are reported as `SchemaMissing`, never as empty data.
//! - This module never creates or alters tables.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod contract;
mod inspect;
mod open;

pub use contract::{ensure_instruments_ready, table_exists, REQUIRED_STORE_COLUMNS};
pub use inspect::{list_tables, preview_table, TablePreview};
pub(crate) use inspect::quote_identifier;
pub use open::{open_store, open_store_read_only};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Unreachable {
        path: PathBuf,
        source: rusqlite::Error,
    },
    SchemaMissing {
        table: String,
        column: Option<String>,
    },
    InvalidData(String),
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreachable { path, source } => {
                write!(f, "cannot open store `{}`: {source}", path.display())
            }
            Self::SchemaMissing {
                table,
                column: None,
            } => write!(f, "table `{table}` is missing from the store"),
            Self::SchemaMissing {
                table,
                column: Some(column),
            } => write!(f, "column `{column}` is missing from table `{table}`"),
            Self::InvalidData(message) => write!(f, "invalid store data: {message}"),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unreachable { source, .. } => Some(source),
            Self::SchemaMissing { .. } => None,
            Self::InvalidData(_) => None,
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
