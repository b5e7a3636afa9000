//! `rsvp import`: load a CSV guest list into one event.

use crate::cmd::{Project, open_input, write_guest_rows};
use crate::output::{OutputMode, pretty_kv, render};
use anyhow::{Result, bail};
use clap::Args;
use rsvp_core::{EventId, HeaderMode, ingest_csv};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Event the guests belong to.
    #[arg(long, short)]
    pub event: EventId,

    /// CSV file to read; `-` or omitted reads stdin.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Header handling for the first row (overrides `ingest.header`).
    #[arg(long, value_name = "detect|present|absent")]
    pub header: Option<HeaderMode>,

    /// Field delimiter (overrides `ingest.delimiter`).
    #[arg(long, short)]
    pub delimiter: Option<char>,
}

pub fn run_import(args: &ImportArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::load(project_root)?;
    let mut options = project.config.ingest.options()?;
    if let Some(header) = args.header {
        options.header = header;
    }
    if let Some(delimiter) = args.delimiter {
        let Ok(byte) = u8::try_from(delimiter) else {
            bail!("--delimiter must be a single ASCII character, got '{delimiter}'");
        };
        if !byte.is_ascii() {
            bail!("--delimiter must be a single ASCII character, got '{delimiter}'");
        }
        options.delimiter = byte;
    }

    let input = open_input(args.file.as_deref())?;
    let _lock = project.lock(args.event)?;
    let mut store = project.open_store()?;
    debug!(event = %args.event, header = %options.header, "importing csv");
    let report = ingest_csv(&mut store, input, Some(args.event), options)?;

    render(output, &report, |r, w| {
        if output.is_pretty() {
            pretty_kv(w, "Event", r.event.to_string())?;
            pretty_kv(w, "Rows read", r.rows_read.to_string())?;
            pretty_kv(w, "Header", if r.header_skipped { "skipped" } else { "none" })?;
            pretty_kv(w, "Guests", r.guests.len().to_string())?;
            pretty_kv(w, "Invitations", r.invitations_opened.to_string())?;
            if r.plus_ones_defaulted > 0 {
                pretty_kv(w, "Plus-one fixes", r.plus_ones_defaulted.to_string())?;
            }
            Ok(())
        } else {
            writeln!(
                w,
                "imported {} guests into {} invitations",
                r.guests.len(),
                r.invitations_opened
            )?;
            write_guest_rows(w, &r.guests)
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
        args: ImportArgs,
    }

    #[test]
    fn import_args_parse() {
        let w = Wrapper::parse_from(["test", "--event", "2", "--header", "absent", "-d", ";", "g.csv"]);
        assert_eq!(w.args.event, EventId::new(2));
        assert_eq!(w.args.header, Some(HeaderMode::Absent));
        assert_eq!(w.args.delimiter, Some(';'));
        assert_eq!(w.args.file, Some(PathBuf::from("g.csv")));
    }

    #[test]
    fn import_requires_event() {
        assert!(Wrapper::try_parse_from(["test", "g.csv"]).is_err());
    }

    #[test]
    fn import_rejects_unknown_header_mode() {
        assert!(Wrapper::try_parse_from(["test", "--event", "1", "--header", "maybe"]).is_err());
    }
}
