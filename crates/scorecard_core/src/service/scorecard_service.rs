//! Scorecard session service.
//!
//! # Responsibility
//! - Own the canonical section schema, record store and query state of one
//!   session, plus the storage backend they persist to.
//! - Persist synchronously after every successful mutation.
//! - Produce dashboard rows and exports from the current state.
//!
//! # Invariants
//! - Validation errors leave state untouched.
//! - Persistence failures are returned as warnings next to the result; the
//!   in-memory state stays authoritative for the rest of the session.
//! - Opening a session never fails.

use crate::export::csv::{export_csv, export_file_name, ExportError};
use crate::model::record::{InterviewRecord, RecordDraft, RecordId};
use crate::model::section::{SchemaError, SectionDefinition, SectionId, SectionSchema};
use crate::repo::blob_repo::{BlobError, LoadIssue};
use crate::repo::record_repo::{
    load_records, save_records, RecordStore, RecordStoreError, RECORDS_STORAGE_KEY,
};
use crate::repo::schema_repo::{load_schema, save_schema, SECTIONS_STORAGE_KEY};
use crate::search::query::{dashboard_view, QueryState};
use crate::service::aggregator::{average, AverageScore};
use crate::storage::kv_store::KeyValueStore;
use chrono::{DateTime, TimeZone, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type ScorecardResult<T> = Result<T, ScorecardError>;

/// Errors that block a session action.
#[derive(Debug)]
pub enum ScorecardError {
    Schema(SchemaError),
    Record(RecordStoreError),
    Export(ExportError),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ScorecardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema(err) => write!(f, "{err}"),
            Self::Record(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
            Self::Io { path, source } => {
                write!(f, "failed to write `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ScorecardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Schema(err) => Some(err),
            Self::Record(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<SchemaError> for ScorecardError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<RecordStoreError> for ScorecardError {
    fn from(value: RecordStoreError) -> Self {
        Self::Record(value)
    }
}

impl From<ExportError> for ScorecardError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

/// Non-blocking problem surfaced to the user.
#[derive(Debug)]
pub enum ScorecardWarning {
    /// Persisted state was missing or corrupt and defaults were used.
    LoadFallback(LoadIssue),
    /// A mutation succeeded in memory but could not be saved.
    PersistFailed { key: &'static str, error: BlobError },
}

impl Display for ScorecardWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadFallback(issue) => write!(f, "{issue}"),
            Self::PersistFailed { key, error } => {
                write!(f, "changes kept for this session but `{key}` failed to save: {error}")
            }
        }
    }
}

/// Successful action result with an optional persistence warning.
#[derive(Debug)]
#[must_use]
pub struct Outcome<T> {
    pub value: T,
    pub warning: Option<ScorecardWarning>,
}

impl<T> Outcome<T> {
    fn new(value: T, warning: Option<ScorecardWarning>) -> Self {
        Self { value, warning }
    }
}

/// One dashboard line.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRow<'a> {
    /// Current position in the record store.
    pub position: usize,
    pub record: &'a InterviewRecord,
    pub average: AverageScore,
}

/// Session facade over one storage backend.
pub struct ScorecardService<S: KeyValueStore> {
    store: S,
    schema: SectionSchema,
    records: RecordStore,
    query: QueryState,
}

impl<S: KeyValueStore> ScorecardService<S> {
    /// Loads schema and records from `store`, degrading to defaults.
    ///
    /// Returned warnings describe every fallback that was applied.
    pub fn open(store: S) -> (Self, Vec<ScorecardWarning>) {
        let loaded_records = load_records(&store);
        let loaded_schema = load_schema(&store);
        let warnings = [loaded_records.issue, loaded_schema.issue]
            .into_iter()
            .flatten()
            .map(ScorecardWarning::LoadFallback)
            .collect::<Vec<_>>();

        info!(
            "event=session_open module=service status={} records={} sections={}",
            if warnings.is_empty() { "ok" } else { "degraded" },
            loaded_records.value.len(),
            loaded_schema.value.len()
        );

        let service = Self {
            store,
            schema: loaded_schema.value,
            records: loaded_records.value,
            query: QueryState::new(),
        };
        (service, warnings)
    }

    pub fn schema(&self) -> &SectionSchema {
        &self.schema
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    /// Dashboard controls; changes take effect on the next `dashboard` call.
    pub fn query_mut(&mut self) -> &mut QueryState {
        &mut self.query
    }

    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Creates a record stamped with the current instant.
    pub fn create_record(&mut self, draft: &RecordDraft) -> ScorecardResult<Outcome<RecordId>> {
        self.create_record_with_timestamp(draft, Utc::now())
    }

    /// Creates a record with an explicit creation instant.
    pub fn create_record_with_timestamp(
        &mut self,
        draft: &RecordDraft,
        timestamp: DateTime<Utc>,
    ) -> ScorecardResult<Outcome<RecordId>> {
        let id = self.records.create(draft, &self.schema, timestamp)?;
        info!(
            "event=record_create module=service status=ok record_id={} total={}",
            id,
            self.records.len()
        );
        Ok(Outcome::new(id, self.persist_records()))
    }

    /// Replaces record `id`, keeping its id and timestamp.
    pub fn update_record(
        &mut self,
        id: RecordId,
        draft: &RecordDraft,
    ) -> ScorecardResult<Outcome<()>> {
        self.records.update(id, draft, &self.schema)?;
        info!("event=record_update module=service status=ok record_id={id}");
        Ok(Outcome::new((), self.persist_records()))
    }

    /// Replaces the record at store position `index`.
    pub fn update_record_at(
        &mut self,
        index: usize,
        draft: &RecordDraft,
    ) -> ScorecardResult<Outcome<RecordId>> {
        let id = self.records.update_at(index, draft, &self.schema)?;
        info!("event=record_update module=service status=ok record_id={id} index={index}");
        Ok(Outcome::new(id, self.persist_records()))
    }

    pub fn delete_record(&mut self, id: RecordId) -> ScorecardResult<Outcome<InterviewRecord>> {
        let removed = self.records.delete(id)?;
        info!(
            "event=record_delete module=service status=ok record_id={} remaining={}",
            removed.id,
            self.records.len()
        );
        Ok(Outcome::new(removed, self.persist_records()))
    }

    pub fn delete_record_at(
        &mut self,
        index: usize,
    ) -> ScorecardResult<Outcome<InterviewRecord>> {
        let removed = self.records.delete_at(index)?;
        info!(
            "event=record_delete module=service status=ok record_id={} index={} remaining={}",
            removed.id,
            index,
            self.records.len()
        );
        Ok(Outcome::new(removed, self.persist_records()))
    }

    pub fn add_section(&mut self, name: &str, icon: &str) -> ScorecardResult<Outcome<SectionId>> {
        let id = self.schema.add(name, icon)?;
        info!(
            "event=section_add module=service status=ok section_id={} version={}",
            id,
            self.schema.version()
        );
        Ok(Outcome::new(id, self.persist_schema()))
    }

    /// Renames a section; a blank name is ignored and nothing is saved.
    ///
    /// Record entries keep pointing at the section id, so existing scores
    /// follow the new name.
    pub fn rename_section(&mut self, index: usize, new_name: &str) -> ScorecardResult<Outcome<bool>> {
        if !self.schema.rename(index, new_name)? {
            return Ok(Outcome::new(false, None));
        }
        info!(
            "event=section_rename module=service status=ok index={} version={}",
            index,
            self.schema.version()
        );
        Ok(Outcome::new(true, self.persist_schema()))
    }

    pub fn set_section_icon(&mut self, index: usize, icon: &str) -> ScorecardResult<Outcome<()>> {
        self.schema.set_icon(index, icon)?;
        Ok(Outcome::new((), self.persist_schema()))
    }

    /// Removes a section from the schema.
    ///
    /// Scores recorded under it stay in storage but no longer count towards
    /// averages or export columns.
    pub fn remove_section(
        &mut self,
        index: usize,
    ) -> ScorecardResult<Outcome<SectionDefinition>> {
        let removed = match self.schema.remove(index) {
            Ok(removed) => removed,
            Err(err) => {
                warn!("event=section_remove module=service status=rejected index={index} error={err}");
                return Err(err.into());
            }
        };
        info!(
            "event=section_remove module=service status=ok section_id={} version={}",
            removed.id,
            self.schema.version()
        );
        Ok(Outcome::new(removed, self.persist_schema()))
    }

    pub fn reset_sections(&mut self) -> Outcome<()> {
        self.schema.reset_to_defaults();
        Outcome::new((), self.persist_schema())
    }

    /// Average of record `id` under the current schema.
    pub fn average(&self, id: RecordId) -> Option<AverageScore> {
        self.records
            .get(id)
            .map(|record| average(&self.schema, record))
    }

    /// Rows to display right now, honouring the query engagement policy.
    pub fn dashboard<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<DashboardRow<'_>> {
        dashboard_view(self.records.records(), &self.schema, &self.query, now)
            .into_iter()
            .filter_map(|record| {
                let position = self.records.position(record.id)?;
                Some(DashboardRow {
                    position,
                    record,
                    average: average(&self.schema, record),
                })
            })
            .collect()
    }

    /// Full-store CSV with timestamps rendered in `tz`.
    pub fn export_csv<Tz>(&self, tz: &Tz) -> ScorecardResult<String>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        match export_csv(self.records.records(), &self.schema, tz) {
            Ok(csv) => Ok(csv),
            Err(err) => {
                warn!("event=export module=service status=rejected error={err}");
                Err(err.into())
            }
        }
    }

    /// Writes the export into `dir`, named after the UTC date of `now`.
    ///
    /// Timestamps inside the file use the time zone of `now`. No file is
    /// created when there is nothing to export.
    pub fn write_export<Tz>(&self, dir: &Path, now: &DateTime<Tz>) -> ScorecardResult<PathBuf>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let csv = self.export_csv(&now.timezone())?;
        let path = dir.join(export_file_name(now.with_timezone(&Utc).date_naive()));
        std::fs::create_dir_all(dir).map_err(|source| ScorecardError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        std::fs::write(&path, csv.as_bytes()).map_err(|source| ScorecardError::Io {
            path: path.clone(),
            source,
        })?;
        info!(
            "event=export module=service status=ok records={} bytes={}",
            self.records.len(),
            csv.len()
        );
        Ok(path)
    }

    fn persist_records(&self) -> Option<ScorecardWarning> {
        save_records(&self.store, &self.records)
            .err()
            .map(|error| ScorecardWarning::PersistFailed {
                key: RECORDS_STORAGE_KEY,
                error,
            })
    }

    fn persist_schema(&self) -> Option<ScorecardWarning> {
        save_schema(&self.store, &self.schema)
            .err()
            .map(|error| ScorecardWarning::PersistFailed {
                key: SECTIONS_STORAGE_KEY,
                error,
            })
    }
}
