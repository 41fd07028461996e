//! Section schema persistence.
//!
//! # Invariants
//! - The blob is a JSON array of `SectionDefinition`.
//! - Absent, corrupt or empty blobs load as the default 8-section schema.

use crate::model::section::{SectionDefinition, SectionSchema};
use crate::repo::blob_repo::{load_json, save_json, BlobError, BlobResult, Loaded};
use crate::storage::kv_store::KeyValueStore;

/// Storage key of the section schema blob.
pub const SECTIONS_STORAGE_KEY: &str = "scorecardSections";

/// Loads the schema, falling back to defaults.
pub fn load_schema<S: KeyValueStore + ?Sized>(store: &S) -> Loaded<SectionSchema> {
    match load_json::<Vec<SectionDefinition>, _>(store, SECTIONS_STORAGE_KEY) {
        Ok(Some(sections)) => match SectionSchema::from_sections(sections) {
            Ok(schema) => Loaded::clean(schema),
            Err(err) => Loaded::fallback(
                SectionSchema::default(),
                SECTIONS_STORAGE_KEY,
                BlobError::InvalidData {
                    key: SECTIONS_STORAGE_KEY.to_string(),
                    message: err.to_string(),
                },
            ),
        },
        Ok(None) => Loaded::clean(SectionSchema::default()),
        Err(err) => Loaded::fallback(SectionSchema::default(), SECTIONS_STORAGE_KEY, err),
    }
}

/// Persists the full schema.
pub fn save_schema<S: KeyValueStore + ?Sized>(store: &S, schema: &SectionSchema) -> BlobResult<()> {
    save_json(store, SECTIONS_STORAGE_KEY, schema.list())
}
