//! Read-only store inspection: table listing and row previews.

use super::contract::table_exists;
use super::{DbError, DbResult};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde::Serialize;

/// First rows of one table, stringified for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TablePreview {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Lists user tables in name order, skipping SQLite internals.
pub fn list_tables(conn: &Connection) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name
         FROM sqlite_master
         WHERE type = 'table'
           AND name NOT LIKE 'sqlite_%'
         ORDER BY name COLLATE NOCASE ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut tables = Vec::new();
    while let Some(row) = rows.next()? {
        tables.push(row.get(0)?);
    }
    Ok(tables)
}

/// Returns up to `limit` rows of `table` in storage order.
///
/// # Errors
/// - `DbError::SchemaMissing` when the table does not exist.
pub fn preview_table(conn: &Connection, table: &str, limit: u32) -> DbResult<TablePreview> {
    if !table_exists(conn, table)? {
        return Err(DbError::SchemaMissing {
            table: table.to_string(),
            column: None,
        });
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT * FROM {} LIMIT ?1;",
        quote_identifier(table)
    ))?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut rows = stmt.query([i64::from(limit)])?;
    let mut preview_rows = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(columns.len());
        for index in 0..columns.len() {
            cells.push(display_value(row.get_ref(index)?));
        }
        preview_rows.push(cells);
    }

    Ok(TablePreview {
        table: table.to_string(),
        columns,
        rows: preview_rows,
    })
}

pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn display_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(value) => value.to_string(),
        ValueRef::Real(value) => value.to_string(),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Blob(bytes) => format!("<{} bytes>", bytes.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::{list_tables, preview_table, quote_identifier};
    use crate::db::DbError;
    use rusqlite::Connection;

    #[test]
    fn quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("Instruments"), "\"Instruments\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn preview_lists_columns_and_limits_rows() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE Alarms (ID INTEGER, Name TEXT, Level REAL);
             INSERT INTO Alarms VALUES (1, 'hi', 2.5), (2, NULL, 3), (3, 'lo', NULL);",
        )
        .unwrap();

        assert_eq!(list_tables(&conn).unwrap(), vec!["Alarms".to_string()]);

        let preview = preview_table(&conn, "Alarms", 2).unwrap();
        assert_eq!(preview.columns, vec!["ID", "Name", "Level"]);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.rows[0], vec!["1", "hi", "2.5"]);
        assert_eq!(preview.rows[1][1], "");
    }

    #[test]
    fn preview_of_unknown_table_is_schema_missing() {
        let conn = Connection::open_in_memory().unwrap();
        let err = preview_table(&conn, "Nope", 5).unwrap_err();
        assert!(matches!(err, DbError::SchemaMissing { table, column: None } if table == "Nope"));
    }
}
