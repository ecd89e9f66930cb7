//! Differential update of the live store from a validated snapshot.
//!
//! # Responsibility
//! - Match snapshot rows to live records by composite key.
//! - Compute per-field diffs and write only changed columns.
//! - Run the whole pass in one transaction (commit-or-rollback).
//!
//! # Invariants
//! - Unknown keys abort the pass; records are never created or skipped.
//! - A row counts as modified once, regardless of how many fields changed.
//! - Re-applying an unchanged snapshot issues zero writes.

pub mod apply;
pub mod diff;

pub use apply::{apply_update, plan_update, RowChange, UpdateReport};
pub use diff::{diff_fields, FieldChange};
