use crate::model::guest::{GroupId, GuestId};
use std::fmt;

/// Machine-readable error codes for scripts and operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    MissingEvent,
    MixedInvitation,
    ValidationFailed,
    GuestNotFound,
    CorruptStore,
    StoreFailure,
    CsvReadFailed,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// The `E####` tag scripts match on.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::MissingEvent => "E2001",
            Self::MixedInvitation => "E2002",
            Self::ValidationFailed => "E2003",
            Self::GuestNotFound => "E2004",
            Self::CorruptStore => "E3001",
            Self::StoreFailure => "E3002",
            Self::CsvReadFailed => "E4001",
            Self::LockContention => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// One-line title printed ahead of the detail message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Project not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::MissingEvent => "No event associated with guests",
            Self::MixedInvitation => "Guests do not share one invitation",
            Self::ValidationFailed => "Guest field failed validation",
            Self::GuestNotFound => "Guest not found",
            Self::CorruptStore => "Stored guest row is invalid",
            Self::StoreFailure => "Guest store operation failed",
            Self::CsvReadFailed => "CSV input could not be read",
            Self::LockContention => "Lock contention",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `rsvp init` to initialize this directory."),
            Self::ConfigParseError => Some("Fix syntax in .rsvp/config.toml and retry."),
            Self::MissingEvent => {
                Some("Pass --event, or include an `event` field on the first guest.")
            }
            Self::MixedInvitation => Some(
                "Give every guest the same invitation number, or leave it off all of them.",
            ),
            Self::ValidationFailed | Self::GuestNotFound => None,
            Self::CorruptStore => Some("Inspect the guests table; a row violates its constraints."),
            Self::StoreFailure => Some("Check the database path and permissions, then retry."),
            Self::CsvReadFailed => Some("Expected rows of: prefix,first,last,plus_one,extends."),
            Self::LockContention => {
                Some("Retry after the other `rsvp` process releases the event lock.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures raised by a [`GuestStore`](crate::store::GuestStore).
///
/// All of these are fatal to the call in progress. Writes already applied
/// earlier in the same call are not rolled back.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying `SQLite` failure (constraint violation, I/O, locking).
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// `update` targeted an id the store does not hold.
    #[error("guest {0} not found")]
    NotFound(GuestId),

    /// A persisted row could not be mapped back onto a [`GuestRecord`](crate::model::guest::GuestRecord).
    #[error("corrupt guest row: {0}")]
    Corrupt(String),
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Sqlite(_) => ErrorCode::StoreFailure,
            Self::NotFound(_) => ErrorCode::GuestNotFound,
            Self::Corrupt(_) => ErrorCode::CorruptStore,
        }
    }
}

/// Errors surfaced by the guest-list operations.
#[derive(Debug, thiserror::Error)]
pub enum RsvpError {
    /// An operation that partitions by event was given no event.
    #[error("no event associated with these guests")]
    MissingEvent,

    /// A batch carries more than one invitation number, or mixes explicit
    /// numbers with missing ones.
    #[error("guests do not share one invitation: {reason}")]
    MixedInvitation {
        groups: Vec<GroupId>,
        reason: String,
    },

    /// A single field failed a type or shape check.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
}

impl RsvpError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn mixed(groups: Vec<GroupId>, reason: impl Into<String>) -> Self {
        Self::MixedInvitation {
            groups,
            reason: reason.into(),
        }
    }

    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MissingEvent => ErrorCode::MissingEvent,
            Self::MixedInvitation { .. } => ErrorCode::MixedInvitation,
            Self::Validation { .. } => ErrorCode::ValidationFailed,
            Self::Store(err) => err.code(),
            Self::Csv(_) => ErrorCode::CsvReadFailed,
        }
    }

    /// Optional remediation hint for operators.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}
