//! `rsvp list`: list guests grouped by invitation.

use crate::cmd::{Project, write_guest_rows, write_guests_pretty};
use crate::output::{OutputMode, render};
use anyhow::Result;
use clap::Args;
use rsvp_core::{EventId, GroupId, GuestRecord, GuestStore, PublicGuest, RsvpError};
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only this event; every event when omitted.
    #[arg(long, short)]
    pub event: Option<EventId>,

    /// Only this invitation (requires --event).
    #[arg(long, short, requires = "event")]
    pub group: Option<i64>,

    /// Omit response status (the view shown to guests).
    #[arg(long)]
    pub public: bool,
}

pub fn run_list(args: &ListArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::load(project_root)?;
    let store = project.open_store()?;

    let events = match args.event {
        Some(event) => vec![event],
        None => store.events().map_err(RsvpError::from)?,
    };

    let mut guests: Vec<GuestRecord> = Vec::new();
    for event in events {
        let found = match args.group {
            Some(raw) => {
                let group = GroupId::new(raw).ok_or_else(|| RsvpError::Validation {
                    field: "group_id",
                    reason: format!("must be a positive integer, got {raw}"),
                })?;
                store.find_by_group(event, group)
            }
            None => store.find_by_event(event),
        };
        guests.extend(found.map_err(RsvpError::from)?);
    }

    if args.public {
        let public: Vec<PublicGuest<'_>> = guests.iter().map(PublicGuest::from).collect();
        render(output, &public, |_, w| write_listing(w, output, &guests, false))
    } else {
        render(output, &guests, |g, w| write_listing(w, output, g, true))
    }
}

fn write_listing(
    w: &mut dyn Write,
    output: OutputMode,
    guests: &[GuestRecord],
    show_status: bool,
) -> std::io::Result<()> {
    if guests.is_empty() {
        return writeln!(w, "No guests found");
    }
    if output.is_pretty() {
        write_guests_pretty(w, guests, show_status)
    } else if show_status {
        write_guest_rows(w, guests)
    } else {
        for guest in guests {
            writeln!(
                w,
                "{}\t{}\t{}\t+{}\t{}",
                guest.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
                guest.event_id,
                guest.group_id,
                guest.plus_one_count,
                guest.display_name()
            )?;
        }
        Ok(())
    }
}
