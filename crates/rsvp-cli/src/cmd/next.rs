//! `rsvp next`: print the next invitation number of an event.

use crate::cmd::Project;
use crate::output::{OutputMode, render};
use anyhow::Result;
use clap::Args;
use rsvp_core::{EventId, GroupId, next_group_id};
use serde::Serialize;
use std::path::Path;

#[derive(Args, Debug)]
pub struct NextArgs {
    /// Event to allocate for.
    #[arg(long, short)]
    pub event: EventId,
}

#[derive(Debug, Serialize)]
struct NextOutput {
    event: EventId,
    next_group_id: GroupId,
}

/// Read-only: the number is not reserved, so a concurrent writer may take it.
pub fn run_next(args: &NextArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::load(project_root)?;
    let store = project.open_store()?;
    let next = next_group_id(&store, Some(args.event))?;

    let result = NextOutput {
        event: args.event,
        next_group_id: next,
    };
    render(output, &result, |r, w| writeln!(w, "{}", r.next_group_id))
}
