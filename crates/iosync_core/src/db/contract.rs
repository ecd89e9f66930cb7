//! Structural checks for the `Instruments` table.

use super::{DbError, DbResult};
use crate::schema::{Category, Column, INSTRUMENTS_TABLE, TYPE_COLUMN};
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::collections::HashSet;

/// Every store column read or written by export and sync.
pub static REQUIRED_STORE_COLUMNS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    Column::ALL
        .into_iter()
        .map(Column::name)
        .chain(Category::ALL.into_iter().map(Category::name))
        .chain(std::iter::once(TYPE_COLUMN))
        .collect()
});

/// Verifies the `Instruments` table and its required columns exist.
///
/// # Errors
/// - `DbError::SchemaMissing` naming the table, or the first missing column.
pub fn ensure_instruments_ready(conn: &Connection) -> DbResult<()> {
    if !table_exists(conn, INSTRUMENTS_TABLE)? {
        return Err(DbError::SchemaMissing {
            table: INSTRUMENTS_TABLE.to_string(),
            column: None,
        });
    }

    let present = table_columns(conn, INSTRUMENTS_TABLE)?;
    if let Some(missing) = REQUIRED_STORE_COLUMNS
        .iter()
        .find(|column| !present.contains(&column.to_ascii_lowercase()))
    {
        return Err(DbError::SchemaMissing {
            table: INSTRUMENTS_TABLE.to_string(),
            column: Some((*missing).to_string()),
        });
    }

    Ok(())
}

/// Returns whether a table (or view) with this name exists.
///
/// Names compare case-insensitively, as SQLite resolves identifiers.
pub fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type IN ('table', 'view') AND name = ?1 COLLATE NOCASE
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Column names of `table`, lowercased.
fn table_columns(conn: &Connection, table: &str) -> DbResult<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let mut rows = stmt.query([table])?;
    let mut columns = HashSet::new();
    while let Some(row) = rows.next()? {
        columns.insert(row.get::<_, String>(0)?.to_ascii_lowercase());
    }
    Ok(columns)
}
