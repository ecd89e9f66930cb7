//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract used by export and sync.
//! - Isolate SQLite query details from orchestration code.
//!
//! # Invariants
//! - Repositories are constructed only over a verified `Instruments` table.
//! - Writes are keyed by the full composite `(ID, Tag)` key.

pub mod instrument_repo;
