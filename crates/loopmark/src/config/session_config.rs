use crate::config::{DEFAULT_SESSION_TICK_MS, default_session_tick_ms};

use serde::{Deserialize, Serialize};

/// Recording-session sampling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Cadence at which elapsed time is sampled and mirrored, in
    /// milliseconds. The elapsed value itself is drift-free regardless of
    /// this cadence; it only affects display freshness.
    #[serde(default = "default_session_tick_ms")]
    pub tick_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_SESSION_TICK_MS,
        }
    }
}
