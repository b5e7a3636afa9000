//! Forward-only schema migrations, tracked in `PRAGMA user_version`.

use super::schema;
use rusqlite::{Connection, types::Type};
use tracing::info;

/// One schema step. `version` is the `user_version` after it applies.
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "guests table",
        sql: schema::MIGRATION_V1_SQL,
    },
    Migration {
        version: 2,
        name: "invitation lookup index",
        sql: schema::MIGRATION_V2_SQL,
    },
];

/// Latest schema version understood by this binary.
pub const LATEST_SCHEMA_VERSION: u32 = 2;

/// Schema version recorded in the database file; `0` for a blank file.
///
/// # Errors
///
/// Fails if `SQLite` cannot be queried or holds a negative version.
pub fn current_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    let raw: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    u32::try_from(raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(err)))
}

/// Run every step newer than the stored version and return the resulting
/// version. Each step commits on its own, so an interrupted upgrade resumes
/// at the step that failed.
///
/// # Errors
///
/// Fails if any step fails; earlier steps stay applied.
pub fn migrate(conn: &mut Connection) -> rusqlite::Result<u32> {
    let start = current_schema_version(conn)?;
    let mut version = start;

    for step in MIGRATIONS.iter().filter(|m| m.version > start) {
        let tx = conn.transaction()?;
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", i64::from(step.version))?;
        tx.execute(
            "UPDATE store_meta SET schema_version = ?1 WHERE id = 1",
            [i64::from(step.version)],
        )?;
        tx.commit()?;

        info!(version = step.version, name = step.name, "applied guest store migration");
        version = step.version;
    }

    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{LATEST_SCHEMA_VERSION, MIGRATIONS, current_schema_version, migrate};
    use crate::db::schema;
    use rusqlite::{Connection, params};

    fn has_object(conn: &Connection, kind: &str, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1 AND name = ?2",
            params![kind, name],
            |row| row.get::<_, i64>(0),
        )
        .expect("sqlite_master")
            == 1
    }

    #[test]
    fn steps_are_ordered_and_end_at_latest() {
        assert!(MIGRATIONS.windows(2).all(|w| w[0].version < w[1].version));
        assert_eq!(
            MIGRATIONS.last().map(|m| m.version),
            Some(LATEST_SCHEMA_VERSION)
        );
    }

    #[test]
    fn blank_database_reaches_latest_and_stays_there() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;
        assert_eq!(current_schema_version(&conn)?, 0);

        assert_eq!(migrate(&mut conn)?, LATEST_SCHEMA_VERSION);
        assert_eq!(migrate(&mut conn)?, LATEST_SCHEMA_VERSION);

        assert!(has_object(&conn, "table", "guests"));
        for index in schema::REQUIRED_INDEXES {
            assert!(has_object(&conn, "index", index), "missing index {index}");
        }
        let (rows, recorded): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), MAX(schema_version) FROM store_meta",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        assert_eq!(rows, 1);
        assert_eq!(recorded, i64::from(LATEST_SCHEMA_VERSION));
        Ok(())
    }

    #[test]
    fn v1_database_keeps_its_guests() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::MIGRATION_V1_SQL)?;
        conn.pragma_update(None, "user_version", 1_i64)?;
        conn.execute(
            "INSERT INTO guests (event_id, group_id, first_name) VALUES (1, 3, 'Ann')",
            [],
        )?;

        assert_eq!(migrate(&mut conn)?, LATEST_SCHEMA_VERSION);
        let first: String =
            conn.query_row("SELECT first_name FROM guests WHERE group_id = 3", [], |row| {
                row.get(0)
            })?;
        assert_eq!(first, "Ann");
        assert!(has_object(&conn, "index", "idx_guests_event_group_order"));
        Ok(())
    }

    #[test]
    fn table_constraints_reject_invalid_rows() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;
        migrate(&mut conn)?;

        let insert = "INSERT INTO guests (event_id, group_id, first_name, status) \
                      VALUES (?1, ?2, ?3, ?4)";
        assert!(conn.execute(insert, params![1, 0, "Ann", 0]).is_err());
        assert!(conn.execute(insert, params![1, 1, "   ", 0]).is_err());
        assert!(conn.execute(insert, params![1, 1, "Ann", 7]).is_err());
        assert_eq!(conn.execute(insert, params![1, 1, "Ann", 1])?, 1);
        Ok(())
    }
}
