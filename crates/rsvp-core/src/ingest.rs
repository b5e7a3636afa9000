//! CSV guest-list ingestion.
//!
//! Each row holds five positional fields:
//!
//! ```text
//! prefix,first,last,plus_one,extends
//! ```
//!
//! The first data row opens invitation `next_group_id(event)`. After that,
//! a row whose `extends` flag is blank or falsy (`n`, `no`, `f`, `false`, any
//! case) opens the next invitation; any other value keeps the row on the
//! previous row's invitation. Rows are processed strictly in order.
//!
//! An unparsable `plus_one` becomes `0` rather than failing the row. All rows
//! are parsed and validated before anything is written, then persisted with
//! one bulk insert.

use crate::alloc::{following, next_group_id};
use crate::error::RsvpError;
use crate::model::guest::{EventId, GroupId, GuestRecord, ResponseStatus};
use crate::normalize::normalize;
use crate::store::GuestStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// `extends` values that start a new invitation.
const NEW_GROUP_FLAGS: [&str; 5] = ["", "n", "no", "f", "false"];

/// Minimum fields per row; a missing `extends` reads as blank.
const MIN_FIELDS: usize = 4;

/// How the first row is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// Skip row 0 when its first-name field contains "first" and its
    /// last-name field contains "last" (case-insensitive). A real guest whose
    /// names happen to match is dropped too.
    #[default]
    Detect,
    /// Row 0 is always a header.
    Present,
    /// Row 0 is always data.
    Absent,
}

impl HeaderMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Detect => "detect",
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

impl fmt::Display for HeaderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detect" => Ok(Self::Detect),
            "present" | "yes" => Ok(Self::Present),
            "absent" | "no" => Ok(Self::Absent),
            other => Err(format!(
                "invalid header mode '{other}': expected detect, present or absent"
            )),
        }
    }
}

/// Parser settings for [`ingest_csv`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub header: HeaderMode,
    pub delimiter: u8,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            header: HeaderMode::Detect,
            delimiter: b',',
        }
    }
}

/// Summary of one ingestion.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub event: EventId,
    pub rows_read: usize,
    pub header_skipped: bool,
    pub invitations_opened: usize,
    pub plus_ones_defaulted: usize,
    pub guests: Vec<GuestRecord>,
}

/// One CSV row, positionally decoded.
#[derive(Debug)]
struct GuestRow {
    line: u64,
    prefix: String,
    first: String,
    last: String,
    plus_one: String,
    extends: String,
}

impl GuestRow {
    fn looks_like_header(record: &csv::StringRecord) -> bool {
        let field = |i: usize| record.get(i).unwrap_or_default().to_lowercase();
        field(1).contains("first") && field(2).contains("last")
    }

    fn from_record(line: u64, record: &csv::StringRecord) -> Result<Self, RsvpError> {
        if record.len() < MIN_FIELDS {
            return Err(RsvpError::validation(
                "row",
                format!(
                    "line {line}: expected prefix,first,last,plus_one,extends but found {} field(s)",
                    record.len()
                ),
            ));
        }
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();
        Ok(Self {
            line,
            prefix: field(0),
            first: field(1),
            last: field(2),
            plus_one: field(3),
            extends: field(4),
        })
    }

    fn opens_new_group(&self) -> bool {
        let flag = self.extends.trim().to_lowercase();
        NEW_GROUP_FLAGS.contains(&flag.as_str())
    }

    /// `None` when the field is present but not an integer.
    fn plus_one(&self) -> Option<u32> {
        let raw = self.plus_one.trim();
        if raw.is_empty() {
            return Some(0);
        }
        raw.parse().ok()
    }
}

fn reader_builder(options: IngestOptions) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(options.delimiter)
        .has_headers(false)
        .flexible(true);
    builder
}

/// Read CSV guest rows from `input` and persist them for `event`.
///
/// # Errors
///
/// - [`RsvpError::MissingEvent`] when `event` is `None` (nothing is read).
/// - [`RsvpError::Csv`] when the input is not readable CSV.
/// - [`RsvpError::Validation`] when a row has too few fields or no first
///   name, or when a new invitation would need a number past [`GroupId::MAX`].
/// - [`RsvpError::Store`] when allocation or the bulk insert fails.
pub fn ingest_csv<S, R>(
    store: &mut S,
    input: R,
    event: Option<EventId>,
    options: IngestOptions,
) -> Result<IngestReport, RsvpError>
where
    S: GuestStore + ?Sized,
    R: Read,
{
    let event = event.ok_or(RsvpError::MissingEvent)?;
    let mut reader = reader_builder(options).from_reader(input);
    let records = reader.records().map(|result| -> Result<_, RsvpError> {
        let record = result?;
        let line = record.position().map_or(0, csv::Position::line);
        Ok((line, record))
    });
    ingest_records(store, records, event, options)
}

/// Ingest already-split rows. Each item is parsed as exactly one record, so
/// a stray quote never spills into the following rows. Line numbers in
/// errors count items from 1; blank items are skipped.
///
/// # Errors
///
/// Same as [`ingest_csv`].
pub fn ingest_rows<S, I>(
    store: &mut S,
    rows: I,
    event: Option<EventId>,
    options: IngestOptions,
) -> Result<IngestReport, RsvpError>
where
    S: GuestStore + ?Sized,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let event = event.ok_or(RsvpError::MissingEvent)?;
    let records = (1_u64..)
        .zip(rows)
        .map(|(line, row)| -> Result<Option<(u64, csv::StringRecord)>, RsvpError> {
            let text = row.as_ref().trim_end_matches(['\r', '\n']);
            let mut record = csv::StringRecord::new();
            let found = reader_builder(options)
                .from_reader(text.as_bytes())
                .read_record(&mut record)?;
            Ok(found.then_some((line, record)))
        })
        .filter_map(Result::transpose);
    ingest_records(store, records, event, options)
}

fn ingest_records<S, I>(
    store: &mut S,
    records: I,
    event: EventId,
    options: IngestOptions,
) -> Result<IngestReport, RsvpError>
where
    S: GuestStore + ?Sized,
    I: Iterator<Item = Result<(u64, csv::StringRecord), RsvpError>>,
{
    let mut rows = Vec::new();
    let mut header_skipped = false;
    for (index, result) in records.enumerate() {
        let (line, record) = result?;
        if index == 0 {
            let skip = match options.header {
                HeaderMode::Detect => GuestRow::looks_like_header(&record),
                HeaderMode::Present => true,
                HeaderMode::Absent => false,
            };
            if skip {
                debug!(line, mode = %options.header, "skipping header row");
                header_skipped = true;
                continue;
            }
        }
        rows.push(GuestRow::from_record(line, &record)?);
    }

    let mut report = IngestReport {
        event,
        rows_read: rows.len() + usize::from(header_skipped),
        header_skipped,
        invitations_opened: 0,
        plus_ones_defaulted: 0,
        guests: Vec::new(),
    };
    if rows.is_empty() {
        info!(event = %event, "csv contained no guest rows");
        return Ok(report);
    }

    let mut records = Vec::with_capacity(rows.len());
    let mut current: Option<GroupId> = None;
    for row in &rows {
        let group = match current {
            None => next_group_id(&*store, Some(event))?,
            Some(previous) if row.opens_new_group() => {
                following(previous).map_err(|err| at_line(err, row.line))?
            }
            Some(previous) => previous,
        };
        if current != Some(group) {
            report.invitations_opened += 1;
            debug!(line = row.line, group = %group, "opened invitation");
        }
        current = Some(group);

        let plus_one = row.plus_one().unwrap_or_else(|| {
            warn!(line = row.line, value = %row.plus_one, "unparsable plus-one count, using 0");
            report.plus_ones_defaulted += 1;
            0
        });

        let mut record = GuestRecord::new(event, group, row.first.as_str());
        record.prefix = Some(row.prefix.clone());
        record.last_name = Some(row.last.clone());
        record.plus_one_count = plus_one;
        record.status = ResponseStatus::NotResponded;
        normalize(&mut record);
        record.validate().map_err(|err| at_line(err, row.line))?;
        records.push(record);
    }

    report.guests = store.bulk_insert(records)?;
    info!(
        event = %event,
        guests = report.guests.len(),
        invitations = report.invitations_opened,
        header_skipped,
        "ingested csv guest list"
    );
    Ok(report)
}

fn at_line(err: RsvpError, line: u64) -> RsvpError {
    match err {
        RsvpError::Validation { field, reason } => RsvpError::Validation {
            field,
            reason: format!("line {line}: {reason}"),
        },
        other => other,
    }
}
