//! Instrument domain model and canonical values.
//!
//! # Responsibility
//! - Define the record shape read from the live store.
//! - Define the canonical value form used by snapshot parsing and diffing.
//!
//! # Invariants
//! - Every record is identified by its composite `(ID, Tag)` key.
//! - Values are coerced to their column kind before comparison.

pub mod instrument;
pub mod value;
