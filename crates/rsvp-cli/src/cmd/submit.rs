//! `rsvp submit`: reconcile one invitation from a JSON array of guests.
//!
//! The array is the complete membership: stored members it omits are
//! deleted.

use crate::cmd::{Project, open_input, write_guest_rows, write_guests_pretty};
use crate::output::{OutputMode, render};
use anyhow::{Context as _, Result};
use clap::Args;
use rsvp_core::{EventId, GuestDraft, RsvpError, submit_invitation};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Event of the invitation; defaults to the `event` field of the first guest.
    #[arg(long, short)]
    pub event: Option<EventId>,

    /// JSON file holding an array of guests; `-` or omitted reads stdin.
    #[arg(long, short, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

pub fn run_submit(args: &SubmitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::load(project_root)?;

    let mut raw = String::new();
    open_input(args.file.as_deref())?
        .read_to_string(&mut raw)
        .context("failed to read guest JSON")?;
    let drafts = parse_drafts(&raw)?;

    let event = args
        .event
        .or_else(|| drafts.first().and_then(|d| d.event_id))
        .ok_or(RsvpError::MissingEvent)?;

    let _lock = project.lock(event)?;
    let mut store = project.open_store()?;
    let live = submit_invitation(&mut store, Some(event), &drafts)?;

    render(output, &live, |guests, w| {
        if output.is_pretty() {
            write_guests_pretty(w, guests, true)
        } else {
            write_guest_rows(w, guests)
        }
    })
}

/// Parse a JSON array of guests, or a single guest object.
fn parse_drafts(raw: &str) -> Result<Vec<GuestDraft>> {
    let value: serde_json::Value =
        serde_json::from_str(raw).context("guest input is not valid JSON")?;
    let drafts = if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|one| vec![one])
    };
    drafts.context("guest input does not match the guest shape")
}
