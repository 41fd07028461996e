//! Durable key-value persistence backends.
//!
//! # Responsibility
//! - Define the blob-level `get`/`set` contract the core persists through.
//! - Provide SQLite-backed and in-memory implementations.
//!
//! # Invariants
//! - Backends are local-only and fallible; callers decide how to degrade.
//! - Blobs are opaque UTF-8 text; encoding is owned by repositories.

pub mod kv_store;
