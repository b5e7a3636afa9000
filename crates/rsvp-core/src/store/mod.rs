//! Persistence contract for guests.
//!
//! The guest-list operations only ever talk to storage through
//! [`GuestStore`]. [`MemoryStore`] backs tests and embedders that keep state
//! elsewhere; [`crate::db::SqliteStore`] is the on-disk implementation.

mod memory;

pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::model::guest::{EventId, GroupId, GuestId, GuestRecord};

/// Storage operations the guest-list core depends on.
///
/// Implementations provide no cross-call atomicity. Callers that need
/// all-or-nothing behavior wrap a whole operation in their own transaction,
/// and callers must keep to one writer per event at a time.
pub trait GuestStore {
    /// All live guests of `event`, ordered by invitation then `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing store cannot be read.
    fn find_by_event(&self, event: EventId) -> Result<Vec<GuestRecord>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing store cannot be read.
    fn find_by_id(&self, id: GuestId) -> Result<Option<GuestRecord>, StoreError>;

    /// Persist a new guest and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write is rejected.
    fn insert(&mut self, record: GuestRecord) -> Result<GuestRecord, StoreError>;

    /// Persist several new guests, returned in input order with ids.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when any write is rejected.
    fn bulk_insert(&mut self, records: Vec<GuestRecord>) -> Result<Vec<GuestRecord>, StoreError>;

    /// Overwrite the stored guest that carries `record.id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the id is not stored and
    /// [`StoreError::Corrupt`] when `record` has no id.
    fn update(&mut self, record: &GuestRecord) -> Result<(), StoreError>;

    /// Remove a guest. Removing an id that is not stored is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete is rejected.
    fn delete(&mut self, id: GuestId) -> Result<(), StoreError>;

    /// Live members of one invitation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing store cannot be read.
    fn find_by_group(
        &self,
        event: EventId,
        group: GroupId,
    ) -> Result<Vec<GuestRecord>, StoreError> {
        Ok(self
            .find_by_event(event)?
            .into_iter()
            .filter(|guest| guest.group_id == group)
            .collect())
    }
}

/// Display ordering shared by every store.
pub(crate) fn sort_for_display(guests: &mut [GuestRecord]) {
    guests.sort_by_key(|g| (g.group_id, g.sort_order, g.id));
}
