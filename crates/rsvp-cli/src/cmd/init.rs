use crate::cmd::Project;
use crate::output::{OutputMode, render};
use anyhow::{Context as _, Result};
use clap::Args;
use rsvp_core::config;
use rsvp_core::db::migrations::LATEST_SCHEMA_VERSION;
use serde::Serialize;
use std::path::Path;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite the default config even if `.rsvp/` already exists.
    #[arg(long)]
    pub force: bool,
}

const CONFIG_TOML: &str = "[ingest]\n\
    # detect | present | absent\n\
    header = \"detect\"\n\
    delimiter = \",\"\n\
    \n\
    [store]\n\
    path = \"guests.sqlite3\"\n\
    \n\
    [lock]\n\
    timeout_ms = 5000\n";

const GITIGNORE: &str = "guests.sqlite3*\nlocks/\n";

#[derive(Debug, Serialize)]
struct InitOutput {
    project_dir: String,
    store: String,
    schema_version: u32,
}

/// Execute `rsvp init`. Creates the project skeleton:
///
/// ```text
/// .rsvp/
///   config.toml      (default project config)
///   .gitignore       (database and lock files)
///   locks/
///   guests.sqlite3   (migrated, empty)
/// ```
///
/// # Errors
///
/// Returns an error if `.rsvp/` already exists and `--force` is not set,
/// or if any filesystem or database operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let dir = config::project_dir(project_root);
    if dir.exists() && !args.force {
        anyhow::bail!(
            "{} already exists. Use `rsvp init --force` to reinitialize.",
            dir.display()
        );
    }

    let lock_dir = config::lock_dir(project_root);
    std::fs::create_dir_all(&lock_dir)
        .with_context(|| format!("Failed to create {}", lock_dir.display()))?;

    let config_path = config::config_path(project_root);
    std::fs::write(&config_path, CONFIG_TOML)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let gitignore_path = dir.join(".gitignore");
    std::fs::write(&gitignore_path, GITIGNORE)
        .with_context(|| format!("Failed to write .gitignore: {}", gitignore_path.display()))?;

    let project = Project::load(project_root)?;
    drop(project.open_store()?);

    let result = InitOutput {
        project_dir: dir.display().to_string(),
        store: config::store_path(project_root, &project.config)
            .display()
            .to_string(),
        schema_version: LATEST_SCHEMA_VERSION,
    };
    render(output, &result, |r, w| {
        writeln!(w, "✓ Initialized {}", r.project_dir)?;
        writeln!(w, "  Store:  {}", r.store)?;
        writeln!(w)?;
        writeln!(w, "Next steps:")?;
        writeln!(w, "  rsvp import --event 1 guests.csv")
    })
}
