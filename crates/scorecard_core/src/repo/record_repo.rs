//! Record store and its persistence.
//!
//! # Responsibility
//! - Own the ordered sequence of interview records for one session.
//! - Address records by position (dashboard order) and by stable id.
//!
//! # Invariants
//! - `slots[id]` is always the current position of record `id`.
//! - Deleting position `i` shifts every later record down by one and keeps
//!   relative order.
//! - Edits replace the whole record but keep its id, its timestamp and the
//!   entries of sections no longer in the schema.

use crate::model::record::{InterviewRecord, RecordDraft, RecordId, RecordValidationError};
use crate::model::section::SectionSchema;
use crate::repo::blob_repo::{load_json, save_json, BlobError, BlobResult, Loaded};
use crate::storage::kv_store::KeyValueStore;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Storage key of the record store blob.
pub const RECORDS_STORAGE_KEY: &str = "interviewScorecards";

pub type RecordStoreResult<T> = Result<T, RecordStoreError>;

/// Errors from record store mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStoreError {
    Validation(RecordValidationError),
    IndexOutOfBounds { index: usize, len: usize },
    NotFound(RecordId),
    DuplicateId(RecordId),
}

impl Display for RecordStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "record index {index} out of bounds for {len} records")
            }
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::DuplicateId(id) => write!(f, "duplicate record id: {id}"),
        }
    }
}

impl Error for RecordStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for RecordStoreError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Ordered, id-indexed collection of interview records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    records: Vec<InterviewRecord>,
    slots: HashMap<RecordId, usize>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from records in storage order.
    pub fn from_records(records: Vec<InterviewRecord>) -> RecordStoreResult<Self> {
        let mut slots = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if slots.insert(record.id, index).is_some() {
                return Err(RecordStoreError::DuplicateId(record.id));
            }
        }
        Ok(Self { records, slots })
    }

    /// Records in store order.
    pub fn records(&self) -> &[InterviewRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&InterviewRecord> {
        self.position(id).map(|index| &self.records[index])
    }

    pub fn get_at(&self, index: usize) -> Option<&InterviewRecord> {
        self.records.get(index)
    }

    /// Current position of `id`, if present.
    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.slots.get(&id).copied()
    }

    /// Builds a record from `draft` and appends it.
    pub fn create(
        &mut self,
        draft: &RecordDraft,
        schema: &SectionSchema,
        now: DateTime<Utc>,
    ) -> RecordStoreResult<RecordId> {
        let record = InterviewRecord::build(Uuid::new_v4(), now, draft, schema)?;
        let id = record.id;
        self.slots.insert(id, self.records.len());
        self.records.push(record);
        Ok(id)
    }

    /// Replaces the record at `index` with one rebuilt from `draft`.
    pub fn update_at(
        &mut self,
        index: usize,
        draft: &RecordDraft,
        schema: &SectionSchema,
    ) -> RecordStoreResult<RecordId> {
        let current = self.checked(index)?;
        let mut record = InterviewRecord::build(current.id, current.timestamp, draft, schema)?;
        // Entries of removed sections survive the edit.
        for (section_id, entry) in &current.sections {
            if schema.find(*section_id).is_none() {
                record.sections.insert(*section_id, entry.clone());
            }
        }
        let id = record.id;
        self.records[index] = record;
        Ok(id)
    }

    /// Replaces the record `id` with one rebuilt from `draft`.
    pub fn update(
        &mut self,
        id: RecordId,
        draft: &RecordDraft,
        schema: &SectionSchema,
    ) -> RecordStoreResult<()> {
        let index = self.position(id).ok_or(RecordStoreError::NotFound(id))?;
        self.update_at(index, draft, schema)?;
        Ok(())
    }

    /// Removes the record at `index`, shifting later records down.
    pub fn delete_at(&mut self, index: usize) -> RecordStoreResult<InterviewRecord> {
        self.checked(index)?;
        let removed = self.records.remove(index);
        self.slots.remove(&removed.id);
        for (slot, record) in self.records.iter().enumerate().skip(index) {
            self.slots.insert(record.id, slot);
        }
        Ok(removed)
    }

    /// Removes record `id`.
    pub fn delete(&mut self, id: RecordId) -> RecordStoreResult<InterviewRecord> {
        let index = self.position(id).ok_or(RecordStoreError::NotFound(id))?;
        self.delete_at(index)
    }

    fn checked(&self, index: usize) -> RecordStoreResult<&InterviewRecord> {
        self.records
            .get(index)
            .ok_or(RecordStoreError::IndexOutOfBounds {
                index,
                len: self.records.len(),
            })
    }
}

/// Loads the record store, falling back to an empty store.
pub fn load_records<S: KeyValueStore + ?Sized>(store: &S) -> Loaded<RecordStore> {
    match load_json::<Vec<InterviewRecord>, _>(store, RECORDS_STORAGE_KEY) {
        Ok(Some(records)) => match RecordStore::from_records(records) {
            Ok(record_store) => Loaded::clean(record_store),
            Err(err) => Loaded::fallback(
                RecordStore::new(),
                RECORDS_STORAGE_KEY,
                BlobError::InvalidData {
                    key: RECORDS_STORAGE_KEY.to_string(),
                    message: err.to_string(),
                },
            ),
        },
        Ok(None) => Loaded::clean(RecordStore::new()),
        Err(err) => Loaded::fallback(RecordStore::new(), RECORDS_STORAGE_KEY, err),
    }
}

/// Persists the full record sequence in store order.
pub fn save_records<S: KeyValueStore + ?Sized>(
    store: &S,
    records: &RecordStore,
) -> BlobResult<()> {
    save_json(store, RECORDS_STORAGE_KEY, records.records())
}
