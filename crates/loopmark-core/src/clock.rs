//! Wall-clock elapsed-time accumulator tolerant of pause/resume.
//!
//! The authoritative elapsed value is always a pure function of the
//! accumulated past segments plus an explicitly sampled `now_ms`, so a UI
//! may sample on any tick cadence (or miss ticks entirely while throttled)
//! without introducing drift.

use tracing::debug;

/// Clock lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockState {
    /// Never started, or reset.
    #[default]
    Idle,
    /// A running segment is open.
    Running,
    /// Between segments; accumulated time is frozen.
    Paused,
}

/// Accumulates elapsed recording time across pause/resume cycles.
///
/// All operations take an explicit `now_ms` (wall-clock milliseconds) so the
/// clock itself never reads the system time. Callers sample one instant and
/// use it for both the clock and any mark mutation derived from it, keeping
/// the two consistent under racing input sources.
#[derive(Debug, Default)]
pub struct ElapsedClock {
    /// Time elapsed in segments closed before the current one.
    accumulated_ms: u64,
    /// Wall-clock instant the current running segment began.
    segment_start_ms: u64,
    state: ClockState,
}

impl ElapsedClock {
    /// Create a clock in the Idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Begin a new timeline at `now_ms`, discarding any previous state.
    pub fn start(&mut self, now_ms: u64) {
        self.accumulated_ms = 0;
        self.segment_start_ms = now_ms;
        self.state = ClockState::Running;
    }

    /// Close the current running segment, folding it into the accumulator.
    ///
    /// No-op unless Running. Multiple input sources (keyboard, UI buttons,
    /// overlay windows) may race to request the same transition, so a
    /// redundant pause is not an error.
    pub fn pause(&mut self, now_ms: u64) {
        if self.state != ClockState::Running {
            debug!(state = ?self.state, "pause ignored");
            return;
        }
        self.accumulated_ms += now_ms.saturating_sub(self.segment_start_ms);
        self.state = ClockState::Paused;
    }

    /// Open a new running segment at `now_ms`.
    ///
    /// No-op unless Paused, for the same reason pause is idempotent.
    pub fn resume(&mut self, now_ms: u64) {
        if self.state != ClockState::Paused {
            debug!(state = ?self.state, "resume ignored");
            return;
        }
        self.segment_start_ms = now_ms;
        self.state = ClockState::Running;
    }

    /// Elapsed milliseconds at the sampled instant.
    ///
    /// Safe to call in any state; while Idle or Paused this returns the
    /// frozen accumulated value. A `now_ms` earlier than the segment start
    /// saturates rather than underflowing.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.state {
            ClockState::Running => {
                self.accumulated_ms + now_ms.saturating_sub(self.segment_start_ms)
            }
            ClockState::Idle | ClockState::Paused => self.accumulated_ms,
        }
    }

    /// Elapsed whole seconds (floor of `elapsed_ms / 1000`).
    pub fn elapsed_seconds(&self, now_ms: u64) -> u64 {
        self.elapsed_ms(now_ms) / 1000
    }

    /// Zero all state and return to Idle.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
