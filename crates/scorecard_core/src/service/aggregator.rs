//! Per-record score aggregation against the current schema.
//!
//! # Invariants
//! - Scores are collected in current schema order, by section id.
//! - Entries for sections no longer in the schema are ignored; schema
//!   sections missing from the record count as absent.

use crate::model::record::InterviewRecord;
use crate::model::score::{ScoreSummary, MAX_SCORE, NOT_AVAILABLE};
use crate::model::section::SectionSchema;
use std::fmt::{Display, Formatter};

/// Display-ready average for one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AverageScore {
    /// No accepted scores under the current schema.
    NotAvailable,
    /// Average rounded to hundredths.
    Rated(f64),
}

impl AverageScore {
    /// Numeric value used for sorting; `NotAvailable` sorts as 0.
    pub fn sort_value(&self) -> f64 {
        match self {
            Self::NotAvailable => 0.0,
            Self::Rated(value) => *value,
        }
    }
}

impl Display for AverageScore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAvailable => f.write_str(NOT_AVAILABLE),
            Self::Rated(value) => write!(f, "{value:.2} / {MAX_SCORE}"),
        }
    }
}

/// Totals of `record` under `schema`.
pub fn summarize(schema: &SectionSchema, record: &InterviewRecord) -> ScoreSummary {
    ScoreSummary::collect(
        schema
            .iter()
            .map(|section| record.entry(section.id).and_then(|entry| entry.score)),
    )
}

/// Average score of `record` under `schema`, e.g. `4.00 / 5` or `N/A`.
pub fn average(schema: &SectionSchema, record: &InterviewRecord) -> AverageScore {
    match summarize(schema, record).average() {
        Some(value) => AverageScore::Rated(value),
        None => AverageScore::NotAvailable,
    }
}
