//! `SQLite` schema for the guest store.
//!
//! - `guests` holds one row per live guest; deletes are hard deletes
//! - `store_meta` records the schema version alongside `PRAGMA user_version`
//!
//! `CHECK` constraints mirror the model invariants so a row written by any
//! other tool still maps back onto a valid guest.

/// Migration v1: guest table and store metadata.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS guests (
    guest_id INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id INTEGER NOT NULL,
    group_id INTEGER NOT NULL CHECK (group_id > 0),
    prefix TEXT CHECK (prefix IS NULL OR length(prefix) <= 7),
    first_name TEXT NOT NULL CHECK (length(trim(first_name)) > 0 AND length(first_name) <= 50),
    last_name TEXT CHECK (last_name IS NULL OR length(last_name) <= 50),
    plus_one_count INTEGER NOT NULL DEFAULT 0 CHECK (plus_one_count >= 0),
    sort_order INTEGER NOT NULL DEFAULT 0,
    status INTEGER NOT NULL DEFAULT 0 CHECK (status IN (0, 1, 2))
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT OR IGNORE INTO store_meta (id, schema_version) VALUES (1, 1);
";

/// Migration v2: lookup indexes for per-event and per-invitation reads.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_guests_event_group_order
    ON guests(event_id, group_id, sort_order);
";

/// Indexes the latest schema must provide.
pub const REQUIRED_INDEXES: &[&str] = &["idx_guests_event_group_order"];
