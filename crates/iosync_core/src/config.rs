//! Engine configuration.
//!
//! # Responsibility
//! - Carry tunables that callers pass explicitly into each operation.
//!
//! # Invariants
//! - Every field has a default; partial config files deserialize cleanly.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_PREVIEW_LIMIT: u32 = 5;

/// Per-invocation engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// How long SQLite waits on a locked store before failing.
    pub busy_timeout_ms: u64,
    /// Row limit used by table previews.
    pub preview_limit: u32,
}

impl SyncConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
        }
    }
}
