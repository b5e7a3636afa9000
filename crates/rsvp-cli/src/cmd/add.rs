//! `rsvp add`: create one guest.

use crate::cmd::{Project, write_guest_rows, write_guests_pretty};
use crate::output::{OutputMode, render};
use anyhow::Result;
use clap::Args;
use rsvp_core::{EventId, GuestDraft, RawGroupId, ResponseStatus, create_guest};
use std::path::Path;

/// Guest fields shared by `add` and `update`. Unset flags leave the field
/// absent on the draft.
#[derive(Args, Debug)]
pub struct GuestFields {
    /// Invitation number to join.
    #[arg(long, short)]
    pub group: Option<i64>,

    /// Honorific, e.g. `mr` or `Dr`.
    #[arg(long)]
    pub prefix: Option<String>,

    /// First name.
    #[arg(long)]
    pub first: Option<String>,

    /// Last name.
    #[arg(long)]
    pub last: Option<String>,

    /// Number of additional unnamed guests allowed.
    #[arg(long)]
    pub plus_one: Option<u32>,

    /// Response: not-responded, attending, not-attending.
    #[arg(long)]
    pub status: Option<ResponseStatus>,

    /// Display order within the invitation.
    #[arg(long)]
    pub sort_order: Option<i64>,
}

impl GuestFields {
    pub fn to_draft(&self, event: Option<EventId>) -> GuestDraft {
        GuestDraft {
            id: None,
            event_id: event,
            group_id: self.group.map(RawGroupId::Number),
            prefix: self.prefix.clone(),
            first_name: self.first.clone(),
            last_name: self.last.clone(),
            plus_one_count: self.plus_one,
            sort_order: self.sort_order,
            status: self.status,
        }
    }
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Event the guest belongs to.
    #[arg(long, short)]
    pub event: EventId,

    #[command(flatten)]
    pub fields: GuestFields,
}

pub fn run_add(args: &AddArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::load(project_root)?;
    let draft = args.fields.to_draft(Some(args.event));

    let _lock = project.lock(args.event)?;
    let mut store = project.open_store()?;
    let guest = create_guest(&mut store, Some(args.event), &draft)?;

    render(output, &guest, |g, w| {
        if output.is_pretty() {
            write_guests_pretty(w, std::slice::from_ref(g), true)
        } else {
            write_guest_rows(w, std::slice::from_ref(g))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: AddArgs,
    }

    #[test]
    fn add_args_build_a_draft() {
        let w = Wrapper::parse_from([
            "test", "--event", "1", "--group", "4", "--prefix", "mr", "--first", "John",
            "--plus-one", "2", "--status", "attending",
        ]);
        let draft = w.args.fields.to_draft(Some(w.args.event));
        assert_eq!(draft.event_id, Some(EventId::new(1)));
        assert_eq!(draft.group_id, Some(RawGroupId::Number(4)));
        assert_eq!(draft.first_name.as_deref(), Some("John"));
        assert_eq!(draft.last_name, None);
        assert_eq!(draft.plus_one_count, Some(2));
        assert_eq!(draft.status, Some(ResponseStatus::Attending));
    }

    #[test]
    fn add_requires_event() {
        assert!(Wrapper::try_parse_from(["test", "--first", "Ann"]).is_err());
    }
}
