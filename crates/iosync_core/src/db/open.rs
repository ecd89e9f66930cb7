//! Connection bootstrap utilities for the live store.
//!
//! # Responsibility
//! - Open existing store files in read-write or read-only mode.
//! - Probe the file so non-database files fail at open time.
//!
//! # Invariants
//! - Missing files are never created.
//! - Returned connections have the configured busy timeout applied.

use super::{DbError, DbResult};
use crate::config::SyncConfig;
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Instant;

/// Opens an existing store file for reading and writing.
///
/// # Side effects
/// - Emits `store_open` logging events with duration and status.
///
/// # Errors
/// - `DbError::Unreachable` when the file is missing, unopenable or not a
///   SQLite database.
pub fn open_store(path: impl AsRef<Path>, config: &SyncConfig) -> DbResult<Connection> {
    open_with_flags(
        path.as_ref(),
        config,
        OpenFlags::SQLITE_OPEN_READ_WRITE,
        "read_write",
    )
}

/// Opens an existing store file for reading only.
///
/// Used by export and dry-run paths so they cannot mutate the store.
pub fn open_store_read_only(path: impl AsRef<Path>, config: &SyncConfig) -> DbResult<Connection> {
    open_with_flags(
        path.as_ref(),
        config,
        OpenFlags::SQLITE_OPEN_READ_ONLY,
        "read_only",
    )
}

fn open_with_flags(
    path: &Path,
    config: &SyncConfig,
    mode_flags: OpenFlags,
    mode: &str,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=store_open module=db status=start mode={mode}");

    let flags = mode_flags | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let result = Connection::open_with_flags(path, flags)
        .and_then(|conn| bootstrap_connection(&conn, config).map(|()| conn));

    match result {
        Ok(conn) => {
            info!(
                "event=store_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=store_open module=db status=error mode={mode} duration_ms={} error_code=store_unreachable error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(DbError::Unreachable {
                path: path.to_path_buf(),
                source: err,
            })
        }
    }
}

fn bootstrap_connection(conn: &Connection, config: &SyncConfig) -> rusqlite::Result<()> {
    conn.busy_timeout(config.busy_timeout())?;
    // SQLite opens lazily; reading the schema surfaces "not a database".
    conn.query_row("SELECT COUNT(*) FROM sqlite_master;", [], |row| {
        row.get::<_, i64>(0)
    })?;
    Ok(())
}
