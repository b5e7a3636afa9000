//! Invitation number allocation.
//!
//! The next free number is recomputed from the store on every call: one more
//! than the highest number held by any live guest of the event. Nothing is
//! cached, so two writers for the same event can be handed the same number;
//! callers hold an [`EventLock`](crate::lock::EventLock) to prevent that.

use crate::error::RsvpError;
use crate::model::guest::{EventId, GroupId, GuestRecord};
use crate::store::GuestStore;
use tracing::debug;

/// Next unused invitation number for `event`.
///
/// Returns [`GroupId::FIRST`] for an event with no guests; otherwise one more
/// than the current maximum, so numbers still in use are never handed out
/// again.
///
/// # Errors
///
/// Returns [`RsvpError::MissingEvent`] when `event` is `None`,
/// [`RsvpError::Store`] when the guests cannot be read, and
/// [`RsvpError::Validation`] when the event already holds [`GroupId::MAX`].
pub fn next_group_id<S: GuestStore + ?Sized>(
    store: &S,
    event: Option<EventId>,
) -> Result<GroupId, RsvpError> {
    let event = event.ok_or(RsvpError::MissingEvent)?;
    let guests = store.find_by_event(event)?;
    let next = next_after(&guests)?;
    debug!(event = %event, next = %next, guests = guests.len(), "allocated invitation number");
    Ok(next)
}

/// One past the highest invitation number among `guests`.
///
/// # Errors
///
/// Returns [`RsvpError::Validation`] when that number does not exist.
pub fn next_after(guests: &[GuestRecord]) -> Result<GroupId, RsvpError> {
    guests
        .iter()
        .map(|g| g.group_id)
        .max()
        .map_or(Ok(GroupId::FIRST), following)
}

/// The invitation number after `group`.
pub(crate) fn following(group: GroupId) -> Result<GroupId, RsvpError> {
    group.next().ok_or_else(|| {
        RsvpError::validation(
            "group_id",
            format!("no invitation number is left after {group}"),
        )
    })
}
