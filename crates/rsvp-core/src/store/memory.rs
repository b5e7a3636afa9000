use super::{GuestStore, sort_for_display};
use crate::error::StoreError;
use crate::model::guest::{EventId, GuestId, GuestRecord};
use std::collections::BTreeMap;

/// Guest store held entirely in memory.
///
/// Ids start at 1 and are never reused, even after deletes.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    guests: BTreeMap<GuestId, GuestRecord>,
    last_id: i64,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live guests across all events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guests.is_empty()
    }

    fn assign_id(&mut self, mut record: GuestRecord) -> GuestRecord {
        self.last_id += 1;
        let id = GuestId::new(self.last_id);
        record.id = Some(id);
        self.guests.insert(id, record.clone());
        record
    }
}

impl GuestStore for MemoryStore {
    fn find_by_event(&self, event: EventId) -> Result<Vec<GuestRecord>, StoreError> {
        let mut guests: Vec<GuestRecord> = self
            .guests
            .values()
            .filter(|g| g.event_id == event)
            .cloned()
            .collect();
        sort_for_display(&mut guests);
        Ok(guests)
    }

    fn find_by_id(&self, id: GuestId) -> Result<Option<GuestRecord>, StoreError> {
        Ok(self.guests.get(&id).cloned())
    }

    fn insert(&mut self, record: GuestRecord) -> Result<GuestRecord, StoreError> {
        Ok(self.assign_id(record))
    }

    fn bulk_insert(&mut self, records: Vec<GuestRecord>) -> Result<Vec<GuestRecord>, StoreError> {
        Ok(records
            .into_iter()
            .map(|record| self.assign_id(record))
            .collect())
    }

    fn update(&mut self, record: &GuestRecord) -> Result<(), StoreError> {
        let id = record
            .id
            .ok_or_else(|| StoreError::Corrupt("update of a guest without an id".into()))?;
        let slot = self.guests.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        *slot = record.clone();
        Ok(())
    }

    fn delete(&mut self, id: GuestId) -> Result<(), StoreError> {
        self.guests.remove(&id);
        Ok(())
    }
}
