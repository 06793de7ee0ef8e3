//! Display-state mirror for a secondary overlay surface.
//!
//! The overlay channel is unreliable: updates may arrive duplicated or out
//! of order (at-least-once delivery). Every update carries a monotonically
//! increasing revision, and the mirror applies last-write-wins per field,
//! dropping anything stale. Mirrored state is display-only and never
//! triggers side-effecting logic.

use serde::{Deserialize, Serialize};

/// One mirrored update from the authoritative session to an overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OverlayUpdate {
    /// Elapsed-duration display changed.
    Duration {
        /// Publisher-assigned revision.
        revision: u64,
        /// Elapsed recording seconds to display.
        elapsed_seconds: u64,
    },
    /// Mark-open indicator changed.
    MarkState {
        /// Publisher-assigned revision.
        revision: u64,
        /// Whether a mark is currently open.
        mark_open: bool,
    },
    /// Pending-mark note text changed.
    Note {
        /// Publisher-assigned revision.
        revision: u64,
        /// Current note text, if any.
        text: Option<String>,
    },
}

impl OverlayUpdate {
    /// The revision stamped on this update.
    pub fn revision(&self) -> u64 {
        match self {
            Self::Duration { revision, .. }
            | Self::MarkState { revision, .. }
            | Self::Note { revision, .. } => *revision,
        }
    }
}

/// What the overlay currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverlayDisplay {
    /// Mirrored elapsed seconds.
    pub elapsed_seconds: u64,
    /// Mirrored mark-open indicator.
    pub mark_open: bool,
    /// Mirrored note text.
    pub note: Option<String>,
}

/// Applies mirrored updates idempotently, per field, last write wins.
#[derive(Debug, Default)]
pub struct OverlayMirror {
    duration_revision: u64,
    mark_revision: u64,
    note_revision: u64,
    display: OverlayDisplay,
}

impl OverlayMirror {
    /// Create a mirror with zeroed display state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current display state.
    pub fn display(&self) -> &OverlayDisplay {
        &self.display
    }

    /// Apply one update. Returns true when the display changed; duplicates
    /// and out-of-order stragglers are dropped.
    pub fn apply(&mut self, update: OverlayUpdate) -> bool {
        match update {
            OverlayUpdate::Duration {
                revision,
                elapsed_seconds,
            } => {
                if revision <= self.duration_revision {
                    return false;
                }
                self.duration_revision = revision;
                self.display.elapsed_seconds = elapsed_seconds;
                true
            }
            OverlayUpdate::MarkState { revision, mark_open } => {
                if revision <= self.mark_revision {
                    return false;
                }
                self.mark_revision = revision;
                self.display.mark_open = mark_open;
                true
            }
            OverlayUpdate::Note { revision, text } => {
                if revision <= self.note_revision {
                    return false;
                }
                self.note_revision = revision;
                self.display.note = text;
                true
            }
        }
    }
}
