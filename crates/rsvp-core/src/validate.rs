//! Invitation consistency checks for guest batches.
//!
//! A batch that is going to be treated as one invitation must agree on its
//! invitation number. Stored records and raw submissions are checked with
//! different rules, so the input is an explicit [`GroupBatch`] variant:
//!
//! - [`GroupBatch::Materialized`]: at most one distinct number.
//! - [`GroupBatch::Raw`]: numbers are coerced first (strings trimmed, blank
//!   treated as absent, numeric text parsed). Either every draft carries the
//!   same number or none carries one. A batch where some drafts name a number
//!   and others do not is rejected.

use crate::error::RsvpError;
use crate::model::guest::{CoercedGroupId, GroupId, GuestDraft, GuestRecord};
use std::collections::BTreeSet;

/// Input to [`validate_group_consistency`].
#[derive(Debug, Clone, Copy)]
pub enum GroupBatch<'a> {
    /// Records that already exist as [`GuestRecord`]s.
    Materialized(&'a [GuestRecord]),
    /// Submitted field mappings not yet turned into records.
    Raw(&'a [GuestDraft]),
}

/// Outcome of a successful consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupResolution {
    /// Every member names this invitation.
    Shared(GroupId),
    /// No member names one; allocate a fresh number and stamp it on all.
    AllocateFresh,
}

impl GroupResolution {
    #[must_use]
    pub const fn group(self) -> Option<GroupId> {
        match self {
            Self::Shared(group) => Some(group),
            Self::AllocateFresh => None,
        }
    }
}

/// Check that `batch` can be handled as a single invitation.
///
/// An empty batch resolves to [`GroupResolution::AllocateFresh`].
///
/// # Errors
///
/// Returns [`RsvpError::MixedInvitation`] when members disagree, or when a
/// raw batch mixes drafts with and without a number. Returns
/// [`RsvpError::Validation`] when a raw number is not positive, or when the
/// only numbers given are non-numeric text.
pub fn validate_group_consistency(batch: GroupBatch<'_>) -> Result<GroupResolution, RsvpError> {
    match batch {
        GroupBatch::Materialized(records) => check_materialized(records),
        GroupBatch::Raw(drafts) => check_raw(drafts),
    }
}

fn check_materialized(records: &[GuestRecord]) -> Result<GroupResolution, RsvpError> {
    let groups: BTreeSet<GroupId> = records.iter().map(|r| r.group_id).collect();
    let mut iter = groups.iter().copied();
    match (iter.next(), iter.next()) {
        (None, _) => Ok(GroupResolution::AllocateFresh),
        (Some(group), None) => Ok(GroupResolution::Shared(group)),
        (Some(_), Some(_)) => Err(RsvpError::mixed(
            groups.into_iter().collect(),
            "stored guests span more than one invitation",
        )),
    }
}

fn check_raw(drafts: &[GuestDraft]) -> Result<GroupResolution, RsvpError> {
    let mut numbers = BTreeSet::new();
    let mut opaque = Vec::new();
    let mut absent = 0_usize;

    for draft in drafts {
        match draft.coerced_group() {
            CoercedGroupId::Absent => absent += 1,
            CoercedGroupId::Number(n) => {
                numbers.insert(n);
            }
            CoercedGroupId::Opaque(text) => opaque.push(text),
        }
    }

    let named: Vec<GroupId> = numbers.iter().copied().filter_map(GroupId::new).collect();

    if numbers.len() > 1 {
        return Err(RsvpError::mixed(
            named,
            "all numbered guests must share one invitation",
        ));
    }

    if absent > 0 && absent < drafts.len() {
        return Err(RsvpError::mixed(
            named,
            format!(
                "{absent} of {} guests have no invitation number; give it to all or none",
                drafts.len()
            ),
        ));
    }

    match numbers.into_iter().next() {
        Some(n) => GroupId::new(n)
            .map(GroupResolution::Shared)
            .ok_or_else(|| {
                RsvpError::validation("group_id", format!("must be a positive integer, got {n}"))
            }),
        None if opaque.is_empty() => Ok(GroupResolution::AllocateFresh),
        None => Err(RsvpError::validation(
            "group_id",
            format!("not a number: '{}'", opaque[0]),
        )),
    }
}
