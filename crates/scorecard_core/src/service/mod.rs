//! Core use-case services.
//!
//! # Responsibility
//! - Derive display values (averages) from records and the current schema.
//! - Orchestrate one scorecard session: mutations, persistence, views, export.
//!
//! # Invariants
//! - Derived values are recomputed on every call, never cached.
//! - Persistence failures never roll back an in-memory mutation.

pub mod aggregator;
pub mod scorecard_service;
