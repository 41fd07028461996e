//! Dashboard query engine.
//!
//! # Responsibility
//! - Filter records by name, decision status and date bucket.
//! - Sort the filtered records by name, score, date or status.
//!
//! # Invariants
//! - Views borrow the record store; they never reorder or copy it.
//! - A view is a pure function of (records, schema, query state, now).

pub mod query;
