//! Subcommands and the project plumbing they share.

pub mod add;
pub mod import;
pub mod init;
pub mod list;
pub mod next;
pub mod submit;
pub mod update;

use crate::output::{CodedError, OutputMode, pretty_section};
use anyhow::{Context as _, Result};
use clap::Subcommand;
use rsvp_core::config::{self, ProjectConfig};
use rsvp_core::db::{self, SqliteStore};
use rsvp_core::error::ErrorCode;
use rsvp_core::lock::EventLock;
use rsvp_core::{EventId, GuestRecord};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        next_help_heading = "Project",
        about = "Initialize an rsvp project",
        long_about = "Create .rsvp/ with a default config.toml and an empty guest database.",
        after_help = "EXAMPLES:\n    # Initialize a project in the current directory\n    rsvp init\n\n    # Rewrite the default config\n    rsvp init --force"
    )]
    Init(init::InitArgs),

    #[command(
        next_help_heading = "Write",
        about = "Import a CSV guest list",
        long_about = "Import rows of prefix,first,last,plus_one,extends into an event. \
            A row with a blank or falsy extends flag starts a new invitation.",
        after_help = "EXAMPLES:\n    # Import a file into event 1\n    rsvp import --event 1 guests.csv\n\n    # Read from stdin, first row is always a header\n    cat guests.csv | rsvp import --event 1 --header present -"
    )]
    Import(import::ImportArgs),

    #[command(
        next_help_heading = "Write",
        about = "Submit the full membership of one invitation",
        long_about = "Reconcile a JSON array of guests against the stored invitation. \
            Guests with a matching id are updated, guests without one are created, and \
            stored members missing from the array are deleted.",
        after_help = "EXAMPLES:\n    # Replace invitation membership from a file\n    rsvp submit --event 1 --file family.json\n\n    # Read the array from stdin\n    echo '[{\"first_name\":\"Ann\"}]' | rsvp submit --event 1"
    )]
    Submit(submit::SubmitArgs),

    #[command(
        next_help_heading = "Write",
        about = "Add one guest",
        long_about = "Add one guest to an existing invitation, or to a new one when --group is omitted.",
        after_help = "EXAMPLES:\n    # Start a new invitation\n    rsvp add --event 1 --prefix mr --first John --last Smith\n\n    # Join invitation 4\n    rsvp add --event 1 --group 4 --first Jane --last Smith"
    )]
    Add(add::AddArgs),

    #[command(
        next_help_heading = "Write",
        about = "Update one guest",
        long_about = "Overwrite the given fields of a stored guest. Fields not passed are kept.",
        after_help = "EXAMPLES:\n    # Record an RSVP\n    rsvp update 12 --status attending\n\n    # Fix a name\n    rsvp update 12 --first Jon"
    )]
    Update(update::UpdateArgs),

    #[command(
        next_help_heading = "Read",
        about = "List guests",
        long_about = "List guests grouped by invitation, for one event or for every event.",
        after_help = "EXAMPLES:\n    # Everything\n    rsvp list\n\n    # One invitation, without response status\n    rsvp list --event 1 --group 4 --public --json"
    )]
    List(list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Print the next invitation number",
        long_about = "Print the invitation number the next new invitation of an event would receive.",
        after_help = "EXAMPLES:\n    rsvp next --event 1"
    )]
    Next(next::NextArgs),
}

/// Dispatch one parsed subcommand.
pub fn run(command: Commands, output: OutputMode, project_root: &Path) -> Result<()> {
    match command {
        Commands::Init(args) => init::run_init(&args, output, project_root),
        Commands::Import(args) => import::run_import(&args, output, project_root),
        Commands::Submit(args) => submit::run_submit(&args, output, project_root),
        Commands::Add(args) => add::run_add(&args, output, project_root),
        Commands::Update(args) => update::run_update(&args, output, project_root),
        Commands::List(args) => list::run_list(&args, output, project_root),
        Commands::Next(args) => next::run_next(&args, output, project_root),
    }
}

/// An initialized project directory and its loaded configuration.
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    pub config: ProjectConfig,
}

impl Project {
    /// Load the project rooted at `root`.
    ///
    /// # Errors
    ///
    /// Fails with `E1001` when `.rsvp/` is missing and `E1002` when the
    /// config file does not parse.
    pub fn load(root: &Path) -> Result<Self> {
        let dir = config::project_dir(root);
        if !dir.is_dir() {
            return Err(CodedError::new(
                ErrorCode::NotInitialized,
                format!("no {} directory in {}", config::PROJECT_DIR, root.display()),
            )
            .into());
        }
        let config = config::load_project_config(root)
            .map_err(|err| CodedError::new(ErrorCode::ConfigParseError, format!("{err:#}")))?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    /// Open (and migrate) the guest database.
    pub fn open_store(&self) -> Result<SqliteStore> {
        let path = config::store_path(&self.root, &self.config);
        db::open_store(&path)
            .map_err(|err| CodedError::new(ErrorCode::StoreFailure, format!("{err:#}")).into())
    }

    /// Take the writer lock for `event`, waiting up to the configured timeout.
    pub fn lock(&self, event: EventId) -> Result<EventLock> {
        Ok(EventLock::acquire(
            &config::lock_dir(&self.root),
            event,
            self.config.lock.timeout(),
        )?)
    }
}

/// Open `path` for reading; `-` or no path means stdin.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path)
                .with_context(|| format!("failed to open input {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// One tab-separated line per guest.
pub fn write_guest_rows(w: &mut dyn Write, guests: &[GuestRecord]) -> io::Result<()> {
    for guest in guests {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t+{}\t{}",
            guest.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
            guest.event_id,
            guest.group_id,
            guest.status,
            guest.plus_one_count,
            guest.display_name()
        )?;
    }
    Ok(())
}

/// Guests framed by invitation, assuming they arrive sorted by invitation.
pub fn write_guests_pretty(
    w: &mut dyn Write,
    guests: &[GuestRecord],
    show_status: bool,
) -> io::Result<()> {
    let mut current = None;
    for guest in guests {
        let key = (guest.event_id, guest.group_id);
        if current != Some(key) {
            if current.is_some() {
                writeln!(w)?;
            }
            pretty_section(
                w,
                &format!("Event {} · Invitation {}", guest.event_id, guest.group_id),
            )?;
            current = Some(key);
        }
        let id = guest.id.map_or_else(|| "-".to_string(), |id| id.to_string());
        let plus = if guest.plus_one_count > 0 {
            format!(" (+{})", guest.plus_one_count)
        } else {
            String::new()
        };
        if show_status {
            writeln!(w, "  #{id:<6} {}{plus}  [{}]", guest.display_name(), guest.status)?;
        } else {
            writeln!(w, "  #{id:<6} {}{plus}", guest.display_name())?;
        }
    }
    Ok(())
}
