//! `SQLite`-backed guest store.
//!
//! File databases run in WAL mode with `synchronous = NORMAL` and a busy
//! timeout, so `rsvp list` keeps working while an import holds the writer.

pub mod migrations;
pub mod query;
pub mod schema;

pub use query::SqliteStore;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::{path::Path, time::Duration};
use tracing::debug;

/// How long a connection waits on the database write lock before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the guest database at `path` and bring its schema up to
/// date. Missing parent directories are created.
///
/// # Errors
///
/// Returns an error if opening, configuring or migrating the database fails.
pub fn open_store(path: &Path) -> Result<SqliteStore> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create guest db directory {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("open guest database {}", path.display()))?;
    let _mode: String = conn
        .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
        .context("enable WAL journal")?;
    conn.pragma_update(None, "synchronous", "NORMAL")
        .context("set synchronous mode")?;

    let store = finish(conn)?;
    debug!(path = %path.display(), "opened guest store");
    Ok(store)
}

/// Fresh in-memory store with the latest schema. Nothing survives the
/// returned value.
///
/// # Errors
///
/// Returns an error if the schema cannot be applied.
pub fn open_in_memory() -> Result<SqliteStore> {
    let conn = Connection::open_in_memory().context("open in-memory guest database")?;
    finish(conn)
}

fn finish(mut conn: Connection) -> Result<SqliteStore> {
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)
        .context("set busy timeout")?;
    migrations::migrate(&mut conn).context("apply guest store migrations")?;
    Ok(SqliteStore::new(conn))
}
