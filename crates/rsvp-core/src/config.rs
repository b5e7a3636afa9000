use crate::ingest::{HeaderMode, IngestOptions};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory under the project root that holds config, database and locks.
pub const PROJECT_DIR: &str = ".rsvp";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub lock: LockConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default)]
    pub header: HeaderMode,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            header: HeaderMode::default(),
            delimiter: default_delimiter(),
        }
    }
}

impl IngestConfig {
    /// Parser options for these settings.
    ///
    /// # Errors
    ///
    /// Returns an error unless `delimiter` is exactly one ASCII character.
    pub fn options(&self) -> Result<IngestOptions> {
        let delimiter = match self.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => *byte,
            _ => bail!(
                "ingest.delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            ),
        };
        Ok(IngestOptions {
            header: self.header,
            delimiter,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file, relative to the project directory unless absolute.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    #[serde(default = "default_lock_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl LockConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[must_use]
pub fn project_dir(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_DIR)
}

#[must_use]
pub fn config_path(project_root: &Path) -> PathBuf {
    project_dir(project_root).join("config.toml")
}

/// Absolute location of the guest database for this project.
#[must_use]
pub fn store_path(project_root: &Path, config: &ProjectConfig) -> PathBuf {
    if config.store.path.is_absolute() {
        config.store.path.clone()
    } else {
        project_dir(project_root).join(&config.store.path)
    }
}

/// Directory holding per-event lock files.
#[must_use]
pub fn lock_dir(project_root: &Path) -> PathBuf {
    project_dir(project_root).join("locks")
}

/// Load `.rsvp/config.toml`, falling back to defaults when it is absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = config_path(project_root);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from("guests.sqlite3")
}

const fn default_lock_timeout_ms() -> u64 {
    5_000
}
