use crate::error::RsvpError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Column limits inherited from the guest table.
pub const MAX_PREFIX_LEN: usize = 7;
pub const MAX_NAME_LEN: usize = 50;

/// Store-assigned identity of a persisted guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestId(i64);

impl GuestId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for GuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of the event that owns a guest; the partition key for
/// invitation numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(i64);

impl EventId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Invitation number. Always positive; unique only within one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct GroupId(u32);

impl GroupId {
    /// The number handed out for an event with no guests.
    pub const FIRST: Self = Self(1);

    /// Returns `None` for zero and negative values.
    #[must_use]
    pub fn new(raw: i64) -> Option<Self> {
        u32::try_from(raw).ok().filter(|n| *n > 0).map(Self)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The following invitation number; `None` once the range is used up.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Largest representable invitation number.
    pub const MAX: Self = Self(u32::MAX);
}

impl TryFrom<i64> for GroupId {
    type Error = String;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| format!("invitation number must be positive, got {raw}"))
    }
}

impl From<GroupId> for i64 {
    fn from(group: GroupId) -> Self {
        Self::from(group.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// RSVP answer. Persisted as `0/1/2`, serialized by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseStatus {
    #[default]
    NotResponded,
    Attending,
    NotAttending,
}

impl ResponseStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::NotResponded => "not-responded",
            Self::Attending => "attending",
            Self::NotAttending => "not-attending",
        }
    }

    /// Integer code used in the guests table.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::NotResponded => 0,
            Self::Attending => 1,
            Self::NotAttending => 2,
        }
    }

    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::NotResponded),
            1 => Some(Self::Attending),
            2 => Some(Self::NotAttending),
            _ => None,
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`ResponseStatus`] from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    pub got: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid response status: '{}'", self.got)
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for ResponseStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "not-responded" | "not_responded" | "pending" => Ok(Self::NotResponded),
            "attending" | "yes" => Ok(Self::Attending),
            "not-attending" | "not_attending" | "no" => Ok(Self::NotAttending),
            _ => Err(ParseStatusError { got: s.to_string() }),
        }
    }
}

/// One guest of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestRecord {
    /// Absent until the store has persisted the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<GuestId>,
    pub event_id: EventId,
    pub group_id: GroupId,
    #[serde(default)]
    pub prefix: Option<String>,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub plus_one_count: u32,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub status: ResponseStatus,
}

impl GuestRecord {
    /// A not-yet-persisted guest with every optional field empty.
    #[must_use]
    pub fn new(event_id: EventId, group_id: GroupId, first_name: impl Into<String>) -> Self {
        Self {
            id: None,
            event_id,
            group_id,
            prefix: None,
            first_name: first_name.into(),
            last_name: None,
            plus_one_count: 0,
            sort_order: 0,
            status: ResponseStatus::NotResponded,
        }
    }

    /// Shape checks applied before anything is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`RsvpError::Validation`] when the first name is blank or a
    /// text field exceeds its column width.
    pub fn validate(&self) -> Result<(), RsvpError> {
        if self.first_name.trim().is_empty() {
            return Err(RsvpError::validation("first_name", "must not be empty"));
        }
        check_len("first_name", &self.first_name, MAX_NAME_LEN)?;
        if let Some(last) = &self.last_name {
            check_len("last_name", last, MAX_NAME_LEN)?;
        }
        if let Some(prefix) = &self.prefix {
            check_len("prefix", prefix, MAX_PREFIX_LEN)?;
        }
        Ok(())
    }

    /// Display name as `prefix first last`, skipping absent parts.
    #[must_use]
    pub fn display_name(&self) -> String {
        [
            self.prefix.as_deref(),
            Some(self.first_name.as_str()),
            self.last_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), RsvpError> {
    let len = value.chars().count();
    if len > max {
        return Err(RsvpError::validation(
            field,
            format!("{len} characters exceeds the limit of {max}"),
        ));
    }
    Ok(())
}

/// Invitation number as it arrives in a raw submission: either a JSON number
/// or a string that may or may not hold one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawGroupId {
    Number(i64),
    Text(String),
}

/// What a [`RawGroupId`] amounts to after coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoercedGroupId {
    Absent,
    Number(i64),
    /// Non-empty and non-numeric; rejected when the guest is persisted.
    Opaque(String),
}

impl RawGroupId {
    /// Trim strings, treat empty as absent and parse numeric text.
    #[must_use]
    pub fn coerce(&self) -> CoercedGroupId {
        match self {
            Self::Number(n) => CoercedGroupId::Number(*n),
            Self::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    CoercedGroupId::Absent
                } else {
                    trimmed.parse::<i64>().map_or_else(
                        |_| CoercedGroupId::Opaque(trimmed.to_string()),
                        CoercedGroupId::Number,
                    )
                }
            }
        }
    }
}

impl From<GroupId> for RawGroupId {
    fn from(group: GroupId) -> Self {
        Self::Number(i64::from(group))
    }
}

/// A guest representation submitted from outside: any subset of fields,
/// with an optional id when it refers to a stored guest.
///
/// Absent and `null` fields are both "not present" and never overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuestDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<GuestId>,
    #[serde(rename = "event", skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<RawGroupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plus_one_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ResponseStatus>,
}

impl GuestDraft {
    /// Coerced view of this draft's invitation number.
    #[must_use]
    pub fn coerced_group(&self) -> CoercedGroupId {
        self.group_id
            .as_ref()
            .map_or(CoercedGroupId::Absent, RawGroupId::coerce)
    }

    /// Copy every present field onto `record`, except identity and the
    /// invitation number, which the caller resolves for the whole batch.
    pub fn apply_to(&self, record: &mut GuestRecord) {
        if let Some(event) = self.event_id {
            record.event_id = event;
        }
        if let Some(prefix) = &self.prefix {
            record.prefix = Some(prefix.clone());
        }
        if let Some(first) = &self.first_name {
            record.first_name.clone_from(first);
        }
        if let Some(last) = &self.last_name {
            record.last_name = Some(last.clone());
        }
        if let Some(plus_one) = self.plus_one_count {
            record.plus_one_count = plus_one;
        }
        if let Some(order) = self.sort_order {
            record.sort_order = order;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
    }

    /// Build a fresh, unpersisted record in `event`/`group`.
    ///
    /// # Errors
    ///
    /// Returns [`RsvpError::Validation`] when no first name is present.
    pub fn to_record(&self, event_id: EventId, group_id: GroupId) -> Result<GuestRecord, RsvpError> {
        let Some(first) = self.first_name.as_deref() else {
            return Err(RsvpError::validation("first_name", "is required"));
        };
        let mut record = GuestRecord::new(event_id, group_id, first);
        self.apply_to(&mut record);
        record.event_id = event_id;
        record.group_id = group_id;
        Ok(record)
    }
}

/// Externally visible projection of a guest: everything except the response
/// status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicGuest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<GuestId>,
    pub event: EventId,
    pub group_id: GroupId,
    pub prefix: Option<&'a str>,
    pub first_name: &'a str,
    pub last_name: Option<&'a str>,
    pub plus_one_count: u32,
    pub sort_order: i64,
}

impl<'a> From<&'a GuestRecord> for PublicGuest<'a> {
    fn from(record: &'a GuestRecord) -> Self {
        Self {
            id: record.id,
            event: record.event_id,
            group_id: record.group_id,
            prefix: record.prefix.as_deref(),
            first_name: &record.first_name,
            last_name: record.last_name.as_deref(),
            plus_one_count: record.plus_one_count,
            sort_order: record.sort_order,
        }
    }
}
