//! Repository layer over the key-value backend.
//!
//! # Responsibility
//! - Encode/decode the record store and section schema as JSON blobs.
//! - Own the in-memory record store and its id -> slot index.
//!
//! # Invariants
//! - Loading never fails: missing or corrupt blobs degrade to defaults and
//!   are reported as `LoadIssue`s.
//! - Saving writes the whole collection under its fixed key.

pub mod blob_repo;
pub mod record_repo;
pub mod schema_repo;
