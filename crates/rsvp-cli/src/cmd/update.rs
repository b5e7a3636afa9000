//! `rsvp update`: overwrite fields of one stored guest.

use crate::cmd::add::GuestFields;
use crate::cmd::{Project, write_guest_rows, write_guests_pretty};
use crate::output::{OutputMode, render};
use anyhow::Result;
use clap::Args;
use rsvp_core::{GuestId, GuestStore, RsvpError, StoreError, update_guest};
use std::path::Path;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Id of the guest to update.
    #[arg(value_name = "ID")]
    pub id: i64,

    #[command(flatten)]
    pub fields: GuestFields,
}

pub fn run_update(args: &UpdateArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::load(project_root)?;
    let id = GuestId::new(args.id);

    // The lock is keyed by event, so look the guest up before taking it.
    let event = project
        .open_store()?
        .find_by_id(id)
        .map_err(RsvpError::from)?
        .ok_or(RsvpError::Store(StoreError::NotFound(id)))?
        .event_id;

    let _lock = project.lock(event)?;
    let mut store = project.open_store()?;
    let guest = update_guest(&mut store, id, &args.fields.to_draft(None))?;

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
    use rsvp_core::ResponseStatus;

    #[test]
    fn update_args_parse() {
        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: UpdateArgs,
        }
        let w = Wrapper::parse_from(["test", "12", "--status", "not-attending", "--last", "Lee"]);
        assert_eq!(w.args.id, 12);
        let draft = w.args.fields.to_draft(None);
        assert_eq!(draft.status, Some(ResponseStatus::NotAttending));
        assert_eq!(draft.last_name.as_deref(), Some("Lee"));
        assert!(draft.first_name.is_none());
        assert!(draft.event_id.is_none());
    }
}
