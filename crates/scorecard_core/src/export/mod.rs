//! Flat-file export of the full record store.
//!
//! # Invariants
//! - Export always covers the whole store in store order; dashboard filters
//!   never apply.
//! - Exporting nothing is an error, not an empty file.

pub mod csv;
