//! Core domain logic for the interview scorecard.
//! This crate owns the record and section schemas, score aggregation,
//! dashboard queries, CSV export and local persistence.

pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod storage;

pub use config::ScorecardConfig;
pub use export::csv::{export_csv, export_file_name, ExportError, EXPORT_MIME_TYPE};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::record::{
    DecisionStatus, InterviewRecord, OverallScore, RawSectionInput, RecordDraft, RecordId,
    RecordValidationError, SectionEntry,
};
pub use model::score::{parse_score_input, ScoreSummary, MAX_SCORE, MIN_SCORE, NOT_AVAILABLE};
pub use model::section::{
    default_sections, SchemaError, SectionDefinition, SectionId, SectionSchema, DEFAULT_ICON,
    ICON_CHOICES,
};
pub use repo::record_repo::{RecordStore, RecordStoreError, RECORDS_STORAGE_KEY};
pub use repo::schema_repo::SECTIONS_STORAGE_KEY;
pub use search::query::{
    dashboard_view, filter_records, sort_records, DateBucket, QueryState, SortColumn,
    SortDirection, SortState,
};
pub use service::aggregator::{average, summarize, AverageScore};
pub use service::scorecard_service::{
    DashboardRow, Outcome, ScorecardError, ScorecardResult, ScorecardService, ScorecardWarning,
};
pub use storage::kv_store::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
