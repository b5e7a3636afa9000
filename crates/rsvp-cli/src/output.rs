//! Rendering for the three output modes.
//!
//! Commands build a serializable value and hand it to [`render`] together
//! with a closure for human output. JSON is always the value itself, so it
//! stays stable when the human layout changes.
//!
//! The mode comes from `--format`, then `--json`, then `RSVP_FORMAT`, and
//! finally from whether stdout is a terminal (pretty) or a pipe (text).

use clap::ValueEnum;
use rsvp_core::RsvpError;
use rsvp_core::error::ErrorCode;
use rsvp_core::lock::LockError;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

/// Environment variable consulted when no format flag is given.
pub const FORMAT_ENV: &str = "RSVP_FORMAT";

pub const PRETTY_RULE_WIDTH: usize = 60;

pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", "-".repeat(PRETTY_RULE_WIDTH))
}

/// Heading line underlined by a rule.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// `key:` padded to a fixed column, then the value.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    let label = format!("{key}:");
    writeln!(w, "{label:<14} {}", value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Sections and alignment for a terminal.
    Pretty,
    /// One tab-separated line per record.
    Text,
    /// The serialized value, pretty-printed.
    Json,
}

impl OutputMode {
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    #[must_use]
    pub const fn is_pretty(self) -> bool {
        matches!(self, Self::Pretty)
    }

    fn from_env_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some(Self::Pretty),
            "text" | "table" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

fn pick_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    env_value: Option<&str>,
    stdout_is_tty: bool,
) -> OutputMode {
    format_flag
        .or_else(|| json_flag.then_some(OutputMode::Json))
        .or_else(|| env_value.and_then(OutputMode::from_env_value))
        .unwrap_or(if stdout_is_tty {
            OutputMode::Pretty
        } else {
            OutputMode::Text
        })
}

/// Output mode for this process, from flags, `RSVP_FORMAT` and the terminal.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    let env_value = std::env::var(FORMAT_ENV).ok();
    pick_output_mode(
        format_flag,
        json_flag,
        env_value.as_deref(),
        io::stdout().is_terminal(),
    )
}

/// A CLI-level failure tagged with a stable error code.
#[derive(Debug, thiserror::Error)]
#[error("{}: {message}", code.message())]
pub struct CodedError {
    pub code: ErrorCode,
    pub message: String,
}

impl CodedError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// What gets printed when a command fails.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    fn coded(message: String, code: ErrorCode, hint: Option<&str>) -> Self {
        Self {
            message,
            suggestion: hint.map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }

    /// Build the most specific error report available for `err`.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        if let Some(rsvp) = err.downcast_ref::<RsvpError>() {
            return rsvp.into();
        }
        if let Some(lock) = err.downcast_ref::<LockError>() {
            return lock.into();
        }
        if let Some(coded) = err.downcast_ref::<CodedError>() {
            return Self::coded(coded.to_string(), coded.code, coded.code.hint());
        }
        Self::new(format!("{err:#}"))
    }
}

impl From<&RsvpError> for CliError {
    fn from(err: &RsvpError) -> Self {
        Self::coded(err.to_string(), err.code(), err.hint())
    }
}

impl From<&LockError> for CliError {
    fn from(err: &LockError) -> Self {
        Self::coded(err.to_string(), err.code(), err.hint())
    }
}

/// Write `value` to stdout: serialized in JSON mode, through `human_fn`
/// otherwise.
pub fn render<T: Serialize + ?Sized>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    if mode.is_json() {
        serde_json::to_writer_pretty(&mut out, value)?;
        writeln!(out)?;
    } else {
        human_fn(value, &mut out)?;
    }
    Ok(())
}

/// Write an error to `out` in the requested format.
fn write_error(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let body = serde_json::json!({ "error": error });
            serde_json::to_writer_pretty(&mut *out, &body)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match &error.error_code {
                Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(hint) = &error.suggestion {
                writeln!(out, "  hint: {hint}")?;
            }
        }
    }
    Ok(())
}

/// Report `error` on stderr.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    write_error(&mut io::stderr().lock(), mode, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsvp_core::StoreError;
    use rsvp_core::model::guest::GuestId;

    #[test]
    fn format_flag_wins_over_json_and_env() {
        let mode = pick_output_mode(Some(OutputMode::Text), true, Some("pretty"), true);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn json_flag_wins_over_env() {
        let mode = pick_output_mode(None, true, Some("text"), true);
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn env_aliases_are_accepted() {
        assert_eq!(
            pick_output_mode(None, false, Some(" JSON "), true),
            OutputMode::Json
        );
        assert_eq!(
            pick_output_mode(None, false, Some("human"), false),
            OutputMode::Pretty
        );
        assert_eq!(
            pick_output_mode(None, false, Some("table"), true),
            OutputMode::Text
        );
    }

    #[test]
    fn unknown_env_falls_through_to_tty() {
        assert_eq!(
            pick_output_mode(None, false, Some("yaml"), true),
            OutputMode::Pretty
        );
        assert_eq!(
            pick_output_mode(None, false, None, false),
            OutputMode::Text
        );
    }

    #[test]
    fn rsvp_error_carries_code_and_hint() {
        let err = CliError::from(&RsvpError::MissingEvent);
        assert_eq!(err.error_code.as_deref(), Some("E2001"));
        assert!(err.suggestion.is_some());
        assert!(err.message.contains("no event"));
    }

    #[test]
    fn anyhow_downcasts_to_store_error_code() {
        let err = anyhow::Error::from(RsvpError::Store(StoreError::NotFound(GuestId::new(9))));
        let cli = CliError::from_anyhow(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E2004"));
        assert_eq!(cli.message, "guest 9 not found");
    }

    #[test]
    fn plain_anyhow_has_no_code() {
        let err = anyhow::anyhow!("boom").context("loading config");
        let cli = CliError::from_anyhow(&err);
        assert!(cli.error_code.is_none());
        assert_eq!(cli.message, "loading config: boom");
    }

    #[test]
    fn coded_error_uses_code_hint() {
        let err = anyhow::Error::from(CodedError::new(ErrorCode::NotInitialized, "no .rsvp"));
        let cli = CliError::from_anyhow(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E1001"));
        assert_eq!(cli.message, "Project not initialized: no .rsvp");
        assert!(cli.suggestion.as_deref().is_some_and(|s| s.contains("rsvp init")));
    }

    #[test]
    fn json_error_is_wrapped() {
        let mut buf = Vec::new();
        write_error(&mut buf, OutputMode::Json, &CliError::from(&RsvpError::MissingEvent))
            .expect("write");
        let value: serde_json::Value = serde_json::from_slice(&buf).expect("valid json");
        assert_eq!(value["error"]["error_code"], "E2001");
    }

    #[test]
    fn text_error_shows_code_and_suggestion() {
        let mut buf = Vec::new();
        write_error(&mut buf, OutputMode::Text, &CliError::from(&RsvpError::MissingEvent))
            .expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("error[E2001]:"));
        assert!(text.contains("hint:"));
    }

    #[test]
    fn busy_lock_maps_to_contention_code() {
        let err = anyhow::Error::from(LockError::Busy {
            event: rsvp_core::EventId::new(2),
            waited: std::time::Duration::from_millis(30),
        });
        let cli = CliError::from_anyhow(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E5001"));
        assert!(cli.message.starts_with("event 2 is held"));
    }
}
