//! Wall-clock sampling seam.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock instants in epoch milliseconds.
///
/// The session samples this once per user action and once per display tick;
/// everything downstream (clock, tracker) consumes the sampled value so that
/// tests can drive time deterministically.
pub trait TimeSource {
    /// Current wall-clock time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// [`TimeSource`] backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> u64 {
        // A system clock before the epoch is not a condition worth
        // propagating; report zero and let elapsed math saturate.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}
