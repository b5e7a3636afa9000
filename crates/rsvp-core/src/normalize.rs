//! Free-text cleanup for guest names.
//!
//! Trims `prefix`, `first_name` and `last_name`, and gives the abbreviated
//! honorifics (`Mr`, `Mrs`, `Ms`, `Dr`, `Mdm`) their trailing period. A
//! prefix or last name that trims to nothing becomes absent.
//!
//! Normalization never fails and is idempotent.

use crate::model::guest::GuestRecord;

/// Honorific stems that are abbreviations and take a period.
const ABBREVIATED_PREFIXES: [&str; 5] = ["mr", "mrs", "ms", "dr", "mdm"];

/// Normalize `record` in place.
pub fn normalize(record: &mut GuestRecord) {
    record.prefix = record.prefix.as_deref().and_then(normalize_prefix);
    let first = record.first_name.trim();
    if first.len() != record.first_name.len() {
        record.first_name = first.to_string();
    }
    record.last_name = record.last_name.as_deref().and_then(non_empty_trimmed);
}

/// Owned variant of [`normalize`].
#[must_use]
pub fn normalized(mut record: GuestRecord) -> GuestRecord {
    normalize(&mut record);
    record
}

/// Trim an honorific and append a period to abbreviated stems.
///
/// Returns `None` when nothing but whitespace was supplied.
#[must_use]
pub fn normalize_prefix(raw: &str) -> Option<String> {
    let trimmed = non_empty_trimmed(raw)?;
    let lowered = trimmed.to_lowercase();
    if ABBREVIATED_PREFIXES.contains(&lowered.as_str()) {
        Some(format!("{trimmed}."))
    } else {
        Some(trimmed)
    }
}

fn non_empty_trimmed(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
