//! Score parsing and average formatting.
//!
//! # Invariants
//! - Accepted scores are integers in `[MIN_SCORE, MAX_SCORE]`.
//! - Averages are rendered with exactly two decimals, rounding half up.

use once_cell::sync::Lazy;
use regex::Regex;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

/// Sentinel rendered when a record has no accepted scores.
pub const NOT_AVAILABLE: &str = "N/A";

static LEADING_INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?[0-9]+)").expect("valid leading integer regex"));

/// Parses a raw form value into an accepted score.
///
/// Uses leading-integer semantics: `" 4"`, `"4.7"` and `"4 stars"` all read
/// as `4`. Only ASCII digits count. Non-numeric, absent or out-of-range input
/// yields `None`; this is never an error for the caller.
pub fn parse_score_input(raw: &str) -> Option<u8> {
    let digits = LEADING_INTEGER_RE.captures(raw)?.get(1)?.as_str();
    let value = digits.parse::<i64>().ok()?;
    if (i64::from(MIN_SCORE)..=i64::from(MAX_SCORE)).contains(&value) {
        u8::try_from(value).ok()
    } else {
        None
    }
}

/// Running total and count of accepted scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreSummary {
    pub total: u32,
    pub count: u32,
}

impl ScoreSummary {
    /// Sums the present scores of an iterator, skipping absent ones.
    pub fn collect(scores: impl IntoIterator<Item = Option<u8>>) -> Self {
        scores
            .into_iter()
            .flatten()
            .fold(Self::default(), |acc, score| Self {
                total: acc.total + u32::from(score),
                count: acc.count + 1,
            })
    }

    /// Average rounded half up to hundredths, `None` when nothing was scored.
    pub fn average_hundredths(&self) -> Option<u32> {
        if self.count == 0 {
            return None;
        }
        // total/count * 100, rounded half up, in integer arithmetic.
        Some((self.total * 200 + self.count) / (self.count * 2))
    }

    /// Average as a float, `None` when nothing was scored.
    pub fn average(&self) -> Option<f64> {
        self.average_hundredths()
            .map(|hundredths| f64::from(hundredths) / 100.0)
    }

    /// `"x.yy"` or `"N/A"`.
    pub fn format_average(&self) -> String {
        match self.average_hundredths() {
            Some(hundredths) => format!("{}.{:02}", hundredths / 100, hundredths % 100),
            None => NOT_AVAILABLE.to_string(),
        }
    }
}
