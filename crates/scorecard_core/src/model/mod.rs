//! Scorecard domain model.
//!
//! # Responsibility
//! - Define the section schema, interview record and score value types.
//! - Keep record construction rules next to the data they produce.
//!
//! # Invariants
//! - Records and sections are identified by stable UUIDs, never by position.
//! - Section entries are keyed by section id, so renames keep scores attached.

pub mod record;
pub mod score;
pub mod section;
