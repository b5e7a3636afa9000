//! [`GuestStore`] over a `rusqlite` connection.

use crate::error::StoreError;
use crate::model::guest::{EventId, GroupId, GuestId, GuestRecord, ResponseStatus};
use crate::store::GuestStore;
use rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_COLUMNS: &str = "SELECT guest_id, event_id, group_id, prefix, first_name, \
     last_name, plus_one_count, sort_order, status FROM guests";

const INSERT_SQL: &str = "INSERT INTO guests (event_id, group_id, prefix, first_name, \
     last_name, plus_one_count, sort_order, status) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

/// Guest store persisted in `SQLite`. Open one with [`super::open_store`].
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wrap a connection whose schema is already migrated.
    #[must_use]
    pub const fn new(conn: Connection) -> Self {
        Self { conn }
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Distinct event ids that have at least one guest.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Sqlite`] when the query fails.
    pub fn events(&self) -> Result<Vec<EventId>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT event_id FROM guests ORDER BY event_id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .map(|id| id.map(EventId::new))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }
}

/// A `guests` row before model invariants are checked.
struct GuestRow {
    guest_id: i64,
    event_id: i64,
    group_id: i64,
    prefix: Option<String>,
    first_name: String,
    last_name: Option<String>,
    plus_one_count: i64,
    sort_order: i64,
    status: i64,
}

impl GuestRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            guest_id: row.get(0)?,
            event_id: row.get(1)?,
            group_id: row.get(2)?,
            prefix: row.get(3)?,
            first_name: row.get(4)?,
            last_name: row.get(5)?,
            plus_one_count: row.get(6)?,
            sort_order: row.get(7)?,
            status: row.get(8)?,
        })
    }

    fn into_record(self) -> Result<GuestRecord, StoreError> {
        let group_id = GroupId::new(self.group_id).ok_or_else(|| {
            StoreError::Corrupt(format!(
                "guest {} has invitation {}",
                self.guest_id, self.group_id
            ))
        })?;
        let plus_one_count = u32::try_from(self.plus_one_count).map_err(|_| {
            StoreError::Corrupt(format!(
                "guest {} has plus-one count {}",
                self.guest_id, self.plus_one_count
            ))
        })?;
        let status = ResponseStatus::from_code(self.status).ok_or_else(|| {
            StoreError::Corrupt(format!(
                "guest {} has status code {}",
                self.guest_id, self.status
            ))
        })?;

        Ok(GuestRecord {
            id: Some(GuestId::new(self.guest_id)),
            event_id: EventId::new(self.event_id),
            group_id,
            prefix: self.prefix,
            first_name: self.first_name,
            last_name: self.last_name,
            plus_one_count,
            sort_order: self.sort_order,
            status,
        })
    }
}

fn insert_row(conn: &Connection, record: &GuestRecord) -> rusqlite::Result<GuestId> {
    conn.execute(
        INSERT_SQL,
        params![
            record.event_id.get(),
            i64::from(record.group_id),
            record.prefix,
            record.first_name,
            record.last_name,
            i64::from(record.plus_one_count),
            record.sort_order,
            record.status.code(),
        ],
    )?;
    Ok(GuestId::new(conn.last_insert_rowid()))
}

impl GuestStore for SqliteStore {
    fn find_by_event(&self, event: EventId) -> Result<Vec<GuestRecord>, StoreError> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE event_id = ?1 ORDER BY group_id, sort_order, guest_id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![event.get()], GuestRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(GuestRow::into_record).collect()
    }

    fn find_by_id(&self, id: GuestId) -> Result<Option<GuestRecord>, StoreError> {
        let sql = format!("{SELECT_COLUMNS} WHERE guest_id = ?1");
        let row = self
            .conn
            .query_row(&sql, params![id.get()], GuestRow::from_row)
            .optional()?;
        row.map(GuestRow::into_record).transpose()
    }

    fn insert(&mut self, mut record: GuestRecord) -> Result<GuestRecord, StoreError> {
        record.id = Some(insert_row(&self.conn, &record)?);
        Ok(record)
    }

    fn bulk_insert(&mut self, records: Vec<GuestRecord>) -> Result<Vec<GuestRecord>, StoreError> {
        let tx = self.conn.transaction()?;
        let mut stored = Vec::with_capacity(records.len());
        for mut record in records {
            record.id = Some(insert_row(&tx, &record)?);
            stored.push(record);
        }
        tx.commit()?;
        Ok(stored)
    }

    fn update(&mut self, record: &GuestRecord) -> Result<(), StoreError> {
        let id = record
            .id
            .ok_or_else(|| StoreError::Corrupt("update of a guest without an id".into()))?;
        let changed = self.conn.execute(
            "UPDATE guests SET event_id = ?1, group_id = ?2, prefix = ?3, first_name = ?4, \
             last_name = ?5, plus_one_count = ?6, sort_order = ?7, status = ?8 \
             WHERE guest_id = ?9",
            params![
                record.event_id.get(),
                i64::from(record.group_id),
                record.prefix,
                record.first_name,
                record.last_name,
                i64::from(record.plus_one_count),
                record.sort_order,
                record.status.code(),
                id.get(),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn delete(&mut self, id: GuestId) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM guests WHERE guest_id = ?1", params![id.get()])?;
        Ok(())
    }
}
