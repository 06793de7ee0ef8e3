use crate::config::{DEFAULT_PLAYBACK_POLL_MS, default_playback_poll_ms};

use serde::{Deserialize, Serialize};

/// Playback polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Cadence of the loop-boundary position poll, in milliseconds.
    /// Bounds the worst-case loop overshoot: one poll's worth of playback
    /// at the current rate.
    #[serde(default = "default_playback_poll_ms")]
    pub poll_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_PLAYBACK_POLL_MS,
        }
    }
}
