#![allow(dead_code)]

use iosync_core::{Category, Column, SyncConfig};
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch directory holding one store file and any snapshots.
pub struct Workspace {
    pub dir: TempDir,
    pub store: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("instruments.db");
        let conn = Connection::open(&store).unwrap();
        provision(&conn);
        Self { dir, store }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn conn(&self) -> Connection {
        Connection::open(&self.store).unwrap()
    }
}

pub fn config() -> SyncConfig {
    SyncConfig::default()
}

/// Creates the `Instruments` table with every column the engine uses.
pub fn provision(conn: &Connection) {
    let mut columns = vec!["\"ID\" INTEGER PRIMARY KEY".to_string()];
    for column in Column::ALL.into_iter().skip(1) {
        let sql_type = match column.kind() {
            iosync_core::schema::ColumnKind::Integer => "INTEGER",
            iosync_core::schema::ColumnKind::Text => "TEXT",
            iosync_core::schema::ColumnKind::Real => "REAL",
            iosync_core::schema::ColumnKind::Flag => "INTEGER",
        };
        columns.push(format!("\"{}\" {sql_type}", column.name()));
    }
    for category in Category::ALL {
        columns.push(format!("\"{}\" INTEGER", category.name()));
    }
    columns.push("\"Type\" TEXT".to_string());

    conn.execute_batch(&format!(
        "CREATE TABLE \"Instruments\" ({});",
        columns.join(", ")
    ))
    .unwrap();
}

/// Inserts an I/O record with only `category` set (`None` leaves all flags false).
pub fn insert_io(conn: &Connection, id: i64, tag: &str, category: Option<Category>) {
    let flags: Vec<Option<bool>> = Category::ALL
        .into_iter()
        .map(|candidate| Some(Some(candidate) == category))
        .collect();
    insert_raw(conn, id, tag, "IO", &flags);
}

/// Inserts a record with explicit tri-state flags and `Type`.
pub fn insert_raw(conn: &Connection, id: i64, tag: &str, kind: &str, flags: &[Option<bool>]) {
    conn.execute(
        "INSERT INTO Instruments
            (ID, Tag, FullDescription, EGULow, EGUHigh, RawLow, RawHigh,
             DigitalInput, DigitalOutput, AnalogInput, AnalogOutput, Type)
         VALUES (?1, ?2, ?3, 0, 100, 4000, 20000, ?4, ?5, ?6, ?7, ?8);",
        params![
            id,
            tag,
            format!("{tag} description"),
            flags[0],
            flags[1],
            flags[2],
            flags[3],
            kind
        ],
    )
    .unwrap();
}

pub fn set_column(conn: &Connection, id: i64, column: &str, value: Value) {
    conn.execute(
        &format!("UPDATE Instruments SET \"{column}\" = ?1 WHERE ID = ?2;"),
        params![value, id],
    )
    .unwrap();
}

pub fn get_column(conn: &Connection, id: i64, column: &str) -> Value {
    conn.query_row(
        &format!("SELECT \"{column}\" FROM Instruments WHERE ID = ?1;"),
        [id],
        |row| row.get(0),
    )
    .unwrap()
}

/// Full table contents, for before/after comparisons.
pub fn dump(conn: &Connection) -> Vec<Vec<Value>> {
    let mut stmt = conn.prepare("SELECT * FROM Instruments ORDER BY ID;").unwrap();
    let width = stmt.column_count();
    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|index| row.get::<_, Value>(index))
                .collect::<rusqlite::Result<Vec<_>>>()
        })
        .unwrap();
    rows.map(Result::unwrap).collect()
}

pub fn assert_file_absent(path: &Path) {
    assert!(!path.exists(), "{} should not exist", path.display());
}
