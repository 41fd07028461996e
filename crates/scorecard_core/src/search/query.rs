//! Filter/sort state and the derived dashboard view.
//!
//! # Invariants
//! - Filtering preserves store order.
//! - Sorting is stable; ties keep their filtered order in both directions.
//! - The full store is shown until some control has been engaged.

use crate::model::record::{DecisionStatus, InterviewRecord};
use crate::model::section::SectionSchema;
use crate::service::aggregator::average;
use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Relative date window for the dashboard filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBucket {
    /// Same local calendar day as now.
    Today,
    /// Within the last 7×24 hours.
    Week,
    /// On or after local midnight one calendar month ago.
    Month,
}

/// Sortable dashboard column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Score,
    Date,
    Status,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Current sort selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<SortColumn>,
    pub direction: SortDirection,
}

impl SortState {
    /// Same column flips direction; a new column starts ascending.
    pub fn toggle(&mut self, column: SortColumn) {
        if self.column == Some(column) {
            self.direction = self.direction.flipped();
        } else {
            self.column = Some(column);
            self.direction = SortDirection::Asc;
        }
    }
}

/// Transient dashboard controls for one session.
///
/// Each setter marks its control as engaged; engagement is what switches
/// the dashboard from the raw store to the derived view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    search_term: String,
    status_filter: Option<DecisionStatus>,
    date_filter: Option<DateBucket>,
    sort: SortState,
    search_engaged: bool,
    status_engaged: bool,
    date_engaged: bool,
    sort_engaged: bool,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn status_filter(&self) -> Option<DecisionStatus> {
        self.status_filter
    }

    pub fn date_filter(&self) -> Option<DateBucket> {
        self.date_filter
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.search_engaged = true;
    }

    pub fn set_status_filter(&mut self, status: Option<DecisionStatus>) {
        self.status_filter = status;
        self.status_engaged = true;
    }

    pub fn set_date_filter(&mut self, bucket: Option<DateBucket>) {
        self.date_filter = bucket;
        self.date_engaged = true;
    }

    /// Clicks a column header.
    pub fn toggle_sort(&mut self, column: SortColumn) {
        self.sort.toggle(column);
        self.sort_engaged = true;
    }

    /// Whether any control has been touched since the last reset.
    pub fn is_engaged(&self) -> bool {
        self.search_engaged || self.status_engaged || self.date_engaged || self.sort_engaged
    }

    /// Clears every control and engagement flag.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Records passing the search, status and date filters, in store order.
pub fn filter_records<'a, Tz: TimeZone>(
    records: &'a [InterviewRecord],
    state: &QueryState,
    now: &DateTime<Tz>,
) -> Vec<&'a InterviewRecord> {
    let needle = state.search_term.to_lowercase();
    let lower_bound = state.date_filter.map(|bucket| bucket_start(bucket, now));

    records
        .iter()
        .filter(|record| record.name.to_lowercase().contains(&needle))
        .filter(|record| {
            state
                .status_filter
                .map_or(true, |status| record.status() == status)
        })
        .filter(|record| match (state.date_filter, lower_bound) {
            (Some(DateBucket::Today), _) => {
                record.timestamp.with_timezone(&now.timezone()).date_naive() == now.date_naive()
            }
            (Some(_), Some(Some(start))) => record.timestamp >= start,
            _ => true,
        })
        .collect()
}

/// Stable-sorts `records` in place by `sort`; no-op without a column.
pub fn sort_records(records: &mut [&InterviewRecord], sort: SortState, schema: &SectionSchema) {
    let Some(column) = sort.column else {
        return;
    };
    records.sort_by(|a, b| {
        let ordering = compare(column, a, b, schema);
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Dashboard rows: the store as-is until a control is engaged, then the
/// filtered and sorted view (possibly empty).
pub fn dashboard_view<'a, Tz: TimeZone>(
    records: &'a [InterviewRecord],
    schema: &SectionSchema,
    state: &QueryState,
    now: &DateTime<Tz>,
) -> Vec<&'a InterviewRecord> {
    if !state.is_engaged() {
        return records.iter().collect();
    }
    let mut view = filter_records(records, state, now);
    sort_records(&mut view, state.sort, schema);
    view
}

fn compare(
    column: SortColumn,
    a: &InterviewRecord,
    b: &InterviewRecord,
    schema: &SectionSchema,
) -> Ordering {
    match column {
        SortColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortColumn::Score => average(schema, a)
            .sort_value()
            .partial_cmp(&average(schema, b).sort_value())
            .unwrap_or(Ordering::Equal),
        SortColumn::Date => a.timestamp.cmp(&b.timestamp),
        SortColumn::Status => a.status().as_str().cmp(b.status().as_str()),
    }
}

/// Inclusive lower bound of `bucket`; `None` for `Today`, which is an exact
/// calendar-day match instead.
fn bucket_start<Tz: TimeZone>(bucket: DateBucket, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
    match bucket {
        DateBucket::Today => None,
        DateBucket::Week => Some(now.with_timezone(&Utc) - Duration::days(7)),
        DateBucket::Month => Some(month_ago_midnight(now)),
    }
}

fn month_ago_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let today = now.date_naive();
    let (year, month) = if today.month() == 1 {
        (today.year() - 1, 12)
    } else {
        (today.year(), today.month() - 1)
    };
    // Day-of-month overflow rolls into the following month (31 Mar -> 3 Mar).
    let target = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.checked_add_days(Days::new(u64::from(today.day() - 1))))
        .unwrap_or(today);
    let midnight = target.and_time(NaiveTime::default());
    match now.timezone().from_local_datetime(&midnight).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&midnight),
    }
}

impl Display for DateBucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
        })
    }
}

impl FromStr for DateBucket {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(format!(
                "unknown date filter `{other}`; expected today|week|month"
            )),
        }
    }
}

impl Display for SortColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Score => "score",
            Self::Date => "date",
            Self::Status => "status",
        })
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "score" => Ok(Self::Score),
            "date" => Ok(Self::Date),
            "status" => Ok(Self::Status),
            other => Err(format!(
                "unknown sort column `{other}`; expected name|score|date|status"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{month_ago_midnight, SortColumn, SortDirection, SortState};
    use chrono::{TimeZone, Utc};

    #[test]
    fn toggle_flips_same_column_and_resets_on_new_column() {
        let mut sort = SortState::default();
        sort.toggle(SortColumn::Name);
        assert_eq!(sort.direction, SortDirection::Asc);
        sort.toggle(SortColumn::Name);
        assert_eq!(sort.direction, SortDirection::Desc);
        sort.toggle(SortColumn::Score);
        assert_eq!(sort.column, Some(SortColumn::Score));
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn month_bound_rolls_day_overflow_forward() {
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 15, 0, 0).unwrap();
        assert_eq!(
            month_ago_midnight(&now),
            Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn month_bound_wraps_year_in_january() {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap();
        assert_eq!(
            month_ago_midnight(&now),
            Utc.with_ymd_and_hms(2025, 12, 15, 0, 0, 0).unwrap()
        );
    }
}
