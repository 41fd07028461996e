//! Comma-separated export of interview records.
//!
//! # Responsibility
//! - Lay out fixed columns followed by two columns per schema section.
//! - Quote data fields with quote doubling.
//!
//! # Invariants
//! - Column order follows the schema passed in, not the schema the records
//!   were created under.
//! - Output lines are joined with `\n` and carry no trailing newline.

use crate::model::record::InterviewRecord;
use crate::model::score::NOT_AVAILABLE;
use crate::model::section::SectionSchema;
use chrono::{NaiveDate, TimeZone};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// MIME type of exported documents.
pub const EXPORT_MIME_TYPE: &str = "text/csv;charset=utf-8";

const EXPORT_FILE_PREFIX: &str = "Interview_Scorecard_Export_";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FIXED_HEADERS: [&str; 5] = [
    "Candidate Name",
    "Interview Date & Time",
    "Overall Average Score",
    "Final Decision",
    "Final Comments",
];

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// There are no records to export.
    EmptyData,
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyData => write!(f, "no data to export"),
        }
    }
}

impl Error for ExportError {}

/// Serializes `records` as CSV, rendering timestamps in `tz`.
///
/// # Errors
/// - `EmptyData` when `records` is empty.
pub fn export_csv<Tz>(
    records: &[InterviewRecord],
    schema: &SectionSchema,
    tz: &Tz,
) -> ExportResult<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if records.is_empty() {
        return Err(ExportError::EmptyData);
    }

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(header_line(schema));
    for record in records {
        lines.push(record_line(record, schema, tz));
    }
    Ok(lines.join("\n"))
}

/// `Interview_Scorecard_Export_YYYY-MM-DD.csv`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{EXPORT_FILE_PREFIX}{}.csv", date.format("%Y-%m-%d"))
}

fn header_line(schema: &SectionSchema) -> String {
    let section_headers = schema.iter().flat_map(|section| {
        [
            format!("{} Score (1-5)", section.name),
            format!("{} Remarks", section.name),
        ]
    });
    FIXED_HEADERS
        .iter()
        .map(|header| (*header).to_string())
        .chain(section_headers)
        .map(|header| escape_header(&header))
        .collect::<Vec<_>>()
        .join(",")
}

fn record_line<Tz>(record: &InterviewRecord, schema: &SectionSchema, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let timestamp = record
        .timestamp
        .with_timezone(tz)
        .format(TIMESTAMP_FORMAT)
        .to_string();

    let mut fields = vec![
        quote(&record.name),
        quote(&timestamp),
        quote(&record.overall.average_score),
        quote(record.status().as_str()),
        quote(&record.final_comment),
    ];
    for section in schema.iter() {
        let entry = record.entry(section.id);
        let score = entry
            .and_then(|entry| entry.score)
            .map_or_else(|| NOT_AVAILABLE.to_string(), |score| score.to_string());
        let comment = entry.map_or("", |entry| entry.comment.as_str());
        fields.push(quote(&score));
        fields.push(quote(comment));
    }
    fields.join(",")
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn escape_header(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        quote(value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{escape_header, export_file_name, quote};
    use chrono::NaiveDate;

    #[test]
    fn quote_doubles_embedded_quotes() {
        assert_eq!(quote(r#"said "hi", left"#), r#""said ""hi"", left""#);
    }

    #[test]
    fn header_is_quoted_only_when_needed() {
        assert_eq!(escape_header("Skill Remarks"), "Skill Remarks");
        assert_eq!(escape_header("Skill, Tools Remarks"), "\"Skill, Tools Remarks\"");
    }

    #[test]
    fn file_name_carries_export_date() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap();
        assert_eq!(
            export_file_name(date),
            "Interview_Scorecard_Export_2026-02-03.csv"
        );
    }
}
