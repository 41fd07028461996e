//! Interview record model and construction rules.
//!
//! # Responsibility
//! - Define the persisted interview record shape.
//! - Build records from raw form input against the current schema.
//!
//! # Invariants
//! - `id` and `timestamp` are assigned once and survive edits.
//! - `overall` always matches the section entries it was computed from.
//! - An empty `final_decision` is read as `Pending` everywhere.

use crate::model::score::{parse_score_input, ScoreSummary};
use crate::model::section::{SectionId, SectionSchema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier assigned to a record at creation.
pub type RecordId = Uuid;

/// Final hiring decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionStatus {
    Selected,
    Rejected,
    Pending,
}

impl DecisionStatus {
    pub const ALL: [DecisionStatus; 3] = [Self::Selected, Self::Rejected, Self::Pending];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Selected => "Selected",
            Self::Rejected => "Rejected",
            Self::Pending => "Pending",
        }
    }
}

impl Display for DecisionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionStatus {
    type Err = RecordValidationError;

    /// Accepts the canonical names case-insensitively.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| RecordValidationError::UnknownDecision(value.to_string()))
    }
}

/// One category's score/comment pair inside a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionEntry {
    /// Accepted score in `[1, 5]`, or `None` when absent/invalid.
    pub score: Option<u8>,
    pub comment: String,
}

/// Totals captured when the record was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallScore {
    pub total_score: u32,
    /// `"x.yy"` or `"N/A"`.
    pub average_score: String,
}

/// Persisted interview scorecard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRecord {
    pub id: RecordId,
    /// Candidate name, trimmed and non-empty.
    pub name: String,
    /// Creation instant; RFC 3339 on the wire.
    pub timestamp: DateTime<Utc>,
    /// Entries keyed by section id. May contain ids of removed sections.
    pub sections: BTreeMap<SectionId, SectionEntry>,
    /// `None` is the unset decision, serialized as `""`.
    #[serde(with = "decision_wire")]
    pub final_decision: Option<DecisionStatus>,
    pub final_comment: String,
    pub overall: OverallScore,
}

impl InterviewRecord {
    /// Builds a record from raw input.
    ///
    /// Each schema section reads its raw score through `parse_score_input`;
    /// rejected scores are stored as absent without failing the build.
    ///
    /// # Errors
    /// - `EmptyCandidateName` when the name is blank after trim.
    pub fn build(
        id: RecordId,
        timestamp: DateTime<Utc>,
        draft: &RecordDraft,
        schema: &SectionSchema,
    ) -> Result<Self, RecordValidationError> {
        let name = draft.candidate_name.trim();
        if name.is_empty() {
            return Err(RecordValidationError::EmptyCandidateName);
        }

        let sections = schema
            .iter()
            .map(|section| {
                let entry = match draft.sections.get(&section.id) {
                    Some(input) => SectionEntry {
                        score: parse_score_input(&input.score),
                        comment: input.comment.trim().to_string(),
                    },
                    None => SectionEntry::default(),
                };
                (section.id, entry)
            })
            .collect::<BTreeMap<_, _>>();

        let summary = ScoreSummary::collect(
            schema
                .iter()
                .map(|section| sections.get(&section.id).and_then(|entry| entry.score)),
        );

        Ok(Self {
            id,
            name: name.to_string(),
            timestamp,
            sections,
            final_decision: draft.final_decision,
            final_comment: draft.final_comment.trim().to_string(),
            overall: OverallScore {
                total_score: summary.total,
                average_score: summary.format_average(),
            },
        })
    }

    /// Effective decision, reading an unset decision as `Pending`.
    pub fn status(&self) -> DecisionStatus {
        self.final_decision.unwrap_or(DecisionStatus::Pending)
    }

    pub fn entry(&self, section_id: SectionId) -> Option<&SectionEntry> {
        self.sections.get(&section_id)
    }

    /// Converts the record back into a draft, e.g. to prefill an edit form.
    pub fn to_draft(&self) -> RecordDraft {
        RecordDraft {
            candidate_name: self.name.clone(),
            sections: self
                .sections
                .iter()
                .map(|(id, entry)| {
                    (
                        *id,
                        RawSectionInput {
                            score: entry.score.map(|s| s.to_string()).unwrap_or_default(),
                            comment: entry.comment.clone(),
                        },
                    )
                })
                .collect(),
            final_decision: self.final_decision,
            final_comment: self.final_comment.clone(),
        }
    }
}

/// Raw field values for one section, as typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSectionInput {
    pub score: String,
    pub comment: String,
}

/// Raw form submission for creating or replacing a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    pub candidate_name: String,
    /// Inputs keyed by section id; sections without input are left blank.
    pub sections: HashMap<SectionId, RawSectionInput>,
    pub final_decision: Option<DecisionStatus>,
    pub final_comment: String,
}

impl RecordDraft {
    pub fn new(candidate_name: impl Into<String>) -> Self {
        Self {
            candidate_name: candidate_name.into(),
            ..Self::default()
        }
    }

    pub fn with_section(
        mut self,
        section_id: SectionId,
        score: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        self.sections.insert(
            section_id,
            RawSectionInput {
                score: score.into(),
                comment: comment.into(),
            },
        );
        self
    }

    pub fn with_decision(mut self, decision: Option<DecisionStatus>) -> Self {
        self.final_decision = decision;
        self
    }

    pub fn with_final_comment(mut self, comment: impl Into<String>) -> Self {
        self.final_comment = comment.into();
        self
    }
}

/// Input errors that block record creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// Candidate name is blank after trim.
    EmptyCandidateName,
    /// Decision text is not one of Selected/Rejected/Pending.
    UnknownDecision(String),
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCandidateName => write!(f, "candidate name must not be blank"),
            Self::UnknownDecision(value) => write!(
                f,
                "unknown decision `{value}`; expected Selected|Rejected|Pending"
            ),
        }
    }
}

impl Error for RecordValidationError {}

mod decision_wire {
    use super::DecisionStatus;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DecisionStatus>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.map_or("", DecisionStatus::as_str))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DecisionStatus>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "" => Ok(None),
            "Selected" => Ok(Some(DecisionStatus::Selected)),
            "Rejected" => Ok(Some(DecisionStatus::Rejected)),
            "Pending" => Ok(Some(DecisionStatus::Pending)),
            other => Err(D::Error::custom(format!("unknown final decision `{other}`"))),
        }
    }
}
