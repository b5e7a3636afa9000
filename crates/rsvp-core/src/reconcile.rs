//! Guest persistence paths: single guests, whole new invitations, and
//! reconciliation of a submitted invitation against its stored members.
//!
//! # Delete by omission
//!
//! [`reconcile`] and [`submit_invitation`] treat the submitted batch as the
//! complete membership of the invitation. Any stored member whose id is not
//! in the batch is deleted. Clients must always send the full current
//! membership, never a diff.
//!
//! Every batch is planned in full (event and invitation resolved, each guest
//! normalized and validated) before the first write, so validation failures
//! leave the store untouched. Store failures part-way through are not rolled
//! back.

use crate::alloc::next_group_id;
use crate::error::RsvpError;
use crate::model::guest::{CoercedGroupId, EventId, GroupId, GuestDraft, GuestId, GuestRecord};
use crate::normalize::normalize;
use crate::store::GuestStore;
use crate::validate::{GroupBatch, GroupResolution, validate_group_consistency};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Write plan for one submitted guest.
#[derive(Debug)]
enum Planned {
    Update(GuestRecord),
    Create(GuestRecord),
}

/// Replace the membership of one invitation with `submitted`.
///
/// `existing` are the stored members (all with ids, all on one invitation).
/// Each submitted draft whose id matches an existing member updates that
/// member; every other draft becomes a new guest; every existing member not
/// named by id is deleted. Returns the live members after the call, updated
/// and created guests in submission order.
///
/// The invitation number is, in order of preference: the number shared by
/// `existing`, the number given on every submitted draft, or a freshly
/// allocated one.
///
/// # Errors
///
/// - [`RsvpError::MissingEvent`] when no event can be determined.
/// - [`RsvpError::MixedInvitation`] when `existing` spans invitations, the
///   drafts disagree, or the drafts name a different invitation than
///   `existing`.
/// - [`RsvpError::Validation`] for duplicate submitted ids, a draft from a
///   different event, or a guest failing field checks.
/// - [`RsvpError::Store`] when a read or write fails.
pub fn reconcile<S: GuestStore + ?Sized>(
    store: &mut S,
    event: Option<EventId>,
    existing: &[GuestRecord],
    submitted: &[GuestDraft],
) -> Result<Vec<GuestRecord>, RsvpError> {
    let stored = validate_group_consistency(GroupBatch::Materialized(existing))?;
    let requested = validate_group_consistency(GroupBatch::Raw(submitted))?;

    let event = resolve_event(event, submitted, existing)?;
    for record in existing {
        if record.event_id != event {
            return Err(RsvpError::validation(
                "event",
                format!("stored guest belongs to event {}, not {event}", record.event_id),
            ));
        }
    }

    let group = match (stored.group(), requested.group()) {
        (Some(have), Some(want)) if have != want => {
            return Err(RsvpError::mixed(
                vec![have, want],
                format!("submitted invitation {want} does not match stored invitation {have}"),
            ));
        }
        (Some(group), _) | (None, Some(group)) => group,
        (None, None) if submitted.is_empty() => {
            return Ok(Vec::new());
        }
        (None, None) => next_group_id(&*store, Some(event))?,
    };

    let mut by_id: HashMap<GuestId, &GuestRecord> = HashMap::with_capacity(existing.len());
    for record in existing {
        let id = record
            .id
            .ok_or_else(|| RsvpError::validation("id", "stored guest has no id"))?;
        by_id.insert(id, record);
    }

    let plan = plan_batch(submitted, event, group, &by_id)?;
    let keep: HashSet<GuestId> = plan
        .iter()
        .filter_map(|p| match p {
            Planned::Update(record) => record.id,
            Planned::Create(_) => None,
        })
        .collect();

    let mut live = Vec::with_capacity(plan.len());
    let (mut updated, mut created) = (0_usize, 0_usize);
    for step in plan {
        match step {
            Planned::Update(record) => {
                store.update(&record)?;
                debug!(id = ?record.id, group = %group, "updated guest");
                updated += 1;
                live.push(record);
            }
            Planned::Create(record) => {
                let record = store.insert(record)?;
                debug!(id = ?record.id, group = %group, "created guest");
                created += 1;
                live.push(record);
            }
        }
    }

    let mut deleted = 0_usize;
    for id in by_id.keys().copied().filter(|id| !keep.contains(id)) {
        store.delete(id)?;
        debug!(id = %id, group = %group, "deleted guest omitted from submission");
        deleted += 1;
    }

    info!(
        event = %event,
        group = %group,
        updated,
        created,
        deleted,
        "reconciled invitation"
    );
    Ok(live)
}

/// Persist `drafts` as one brand-new invitation.
///
/// All drafts land on the number they consistently name, or on a freshly
/// allocated one. Ids on the drafts are ignored. Written with a single
/// [`GuestStore::bulk_insert`].
///
/// # Errors
///
/// Same as [`reconcile`], minus the conditions that involve stored members.
pub fn create_invitation<S: GuestStore + ?Sized>(
    store: &mut S,
    event: Option<EventId>,
    drafts: &[GuestDraft],
) -> Result<Vec<GuestRecord>, RsvpError> {
    let resolution = validate_group_consistency(GroupBatch::Raw(drafts))?;
    let event = resolve_event(event, drafts, &[])?;
    if drafts.is_empty() {
        return Ok(Vec::new());
    }

    let group = match resolution {
        GroupResolution::Shared(group) => group,
        GroupResolution::AllocateFresh => next_group_id(&*store, Some(event))?,
    };

    let records = drafts
        .iter()
        .map(|draft| {
            check_draft(draft, event)?;
            build_new(draft, event, group)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let created = store.bulk_insert(records)?;
    info!(event = %event, group = %group, created = created.len(), "created invitation");
    Ok(created)
}

/// Submit the full membership of one invitation, loading its stored members
/// from `store`.
///
/// The invitation is the number the drafts name, or else the invitation of
/// the stored guests the drafts refer to by id. When neither exists the
/// drafts form a new invitation (see [`create_invitation`]).
///
/// # Errors
///
/// Same as [`reconcile`]. Ids that refer to guests on different invitations
/// fail with [`RsvpError::MixedInvitation`].
pub fn submit_invitation<S: GuestStore + ?Sized>(
    store: &mut S,
    event: Option<EventId>,
    drafts: &[GuestDraft],
) -> Result<Vec<GuestRecord>, RsvpError> {
    let resolution = validate_group_consistency(GroupBatch::Raw(drafts))?;
    let event = resolve_event(event, drafts, &[])?;

    let existing = match resolution {
        GroupResolution::Shared(group) => store.find_by_group(event, group)?,
        GroupResolution::AllocateFresh => {
            let referenced = referenced_guests(&*store, event, drafts)?;
            match validate_group_consistency(GroupBatch::Materialized(&referenced))? {
                GroupResolution::Shared(group) => store.find_by_group(event, group)?,
                GroupResolution::AllocateFresh => {
                    return create_invitation(store, Some(event), drafts);
                }
            }
        }
    };

    reconcile(store, Some(event), &existing, drafts)
}

/// Create one guest.
///
/// Joins the invitation the draft names, or starts a new one.
///
/// # Errors
///
/// [`RsvpError::MissingEvent`] without an event, [`RsvpError::Validation`]
/// for bad fields, [`RsvpError::Store`] on store failure.
pub fn create_guest<S: GuestStore + ?Sized>(
    store: &mut S,
    event: Option<EventId>,
    draft: &GuestDraft,
) -> Result<GuestRecord, RsvpError> {
    let event = resolve_event(event, std::slice::from_ref(draft), &[])?;
    check_draft(draft, event)?;
    let group = match draft_group(draft)? {
        Some(group) => group,
        None => next_group_id(&*store, Some(event))?,
    };
    let record = store.insert(build_new(draft, event, group)?)?;
    info!(id = ?record.id, event = %event, group = %group, "created guest");
    Ok(record)
}

/// Overwrite the present fields of `draft` onto stored guest `id`.
///
/// The id itself is never changed; an id on the draft is ignored.
///
/// # Errors
///
/// [`crate::error::StoreError::NotFound`] (as [`RsvpError::Store`]) when `id`
/// is not stored, [`RsvpError::Validation`] for bad fields.
pub fn update_guest<S: GuestStore + ?Sized>(
    store: &mut S,
    id: GuestId,
    draft: &GuestDraft,
) -> Result<GuestRecord, RsvpError> {
    let mut record = store
        .find_by_id(id)?
        .ok_or(crate::error::StoreError::NotFound(id))?;
    draft.apply_to(&mut record);
    if let Some(group) = draft_group(draft)? {
        record.group_id = group;
    }
    normalize(&mut record);
    record.validate()?;
    store.update(&record)?;
    info!(id = %id, group = %record.group_id, "updated guest");
    Ok(record)
}

fn plan_batch(
    submitted: &[GuestDraft],
    event: EventId,
    group: GroupId,
    by_id: &HashMap<GuestId, &GuestRecord>,
) -> Result<Vec<Planned>, RsvpError> {
    let mut seen = HashSet::with_capacity(submitted.len());
    let mut plan = Vec::with_capacity(submitted.len());

    for draft in submitted {
        check_draft(draft, event)?;

        let matched = match draft.id {
            Some(id) => {
                if !seen.insert(id) {
                    return Err(RsvpError::validation(
                        "id",
                        format!("guest {id} submitted more than once"),
                    ));
                }
                let found = by_id.get(&id).copied();
                if found.is_none() {
                    warn!(id = %id, "submitted id matches no member of this invitation; creating a new guest");
                }
                found
            }
            None => None,
        };

        let step = match matched {
            Some(current) => {
                let mut record = current.clone();
                draft.apply_to(&mut record);
                record.event_id = event;
                record.group_id = group;
                normalize(&mut record);
                record.validate()?;
                Planned::Update(record)
            }
            None => Planned::Create(build_new(draft, event, group)?),
        };
        plan.push(step);
    }

    Ok(plan)
}

fn build_new(draft: &GuestDraft, event: EventId, group: GroupId) -> Result<GuestRecord, RsvpError> {
    let mut record = draft.to_record(event, group)?;
    normalize(&mut record);
    record.validate()?;
    Ok(record)
}

/// Reject drafts that belong to another event or carry a non-numeric number.
fn check_draft(draft: &GuestDraft, event: EventId) -> Result<(), RsvpError> {
    if let Some(own) = draft.event_id.filter(|own| *own != event) {
        return Err(RsvpError::validation(
            "event",
            format!("guest names event {own}, batch is for event {event}"),
        ));
    }
    if let CoercedGroupId::Opaque(text) = draft.coerced_group() {
        return Err(RsvpError::validation(
            "group_id",
            format!("not a number: '{text}'"),
        ));
    }
    Ok(())
}

fn draft_group(draft: &GuestDraft) -> Result<Option<GroupId>, RsvpError> {
    match draft.coerced_group() {
        CoercedGroupId::Absent => Ok(None),
        CoercedGroupId::Number(n) => GroupId::new(n).map(Some).ok_or_else(|| {
            RsvpError::validation("group_id", format!("must be a positive integer, got {n}"))
        }),
        CoercedGroupId::Opaque(text) => Err(RsvpError::validation(
            "group_id",
            format!("not a number: '{text}'"),
        )),
    }
}

/// Explicit event first, then the first draft's, then the stored guests'.
fn resolve_event(
    explicit: Option<EventId>,
    drafts: &[GuestDraft],
    existing: &[GuestRecord],
) -> Result<EventId, RsvpError> {
    explicit
        .or_else(|| drafts.first().and_then(|d| d.event_id))
        .or_else(|| existing.first().map(|r| r.event_id))
        .ok_or(RsvpError::MissingEvent)
}

/// Stored guests of `event` that `drafts` refer to by id.
fn referenced_guests<S: GuestStore + ?Sized>(
    store: &S,
    event: EventId,
    drafts: &[GuestDraft],
) -> Result<Vec<GuestRecord>, RsvpError> {
    let mut found = Vec::new();
    for id in drafts.iter().filter_map(|d| d.id) {
        if let Some(record) = store.find_by_id(id)?.filter(|r| r.event_id == event) {
            found.push(record);
        }
    }
    Ok(found)
}
