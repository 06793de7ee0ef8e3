//! Loopmark Core Library
//!
//! Timed-annotation and loop-playback engine: records elapsed time across
//! pause/resume, tracks annotated sub-intervals ("marks") while a recording
//! is in progress, replays any interval as a tight seek-loop, and
//! reconciles mark timestamps when a recording is extended after the fact.
//!
//! Capture, playback, persistence and merging are collaborator traits; the
//! engine owns only the temporal and state contracts between them.
//!
//! # Example
//!
//! ```no_run
//! use loopmark_core::{CaptureDevice, CoreResult, RecordingSession, SystemTimeSource};
//!
//! fn record<D: CaptureDevice>(device: D) -> CoreResult<()> {
//!     let mut session = RecordingSession::new(device, SystemTimeSource);
//!
//!     session.start()?;
//!     session.toggle_mark();
//!     session.set_note("rehearse this passage");
//!     session.toggle_mark();
//!     let output = session.stop()?;
//!
//!     println!("{} marks over {}s", output.marks.len(), output.duration_seconds);
//!     Ok(())
//! }
//! ```

mod clock;
mod error;
mod extend;
mod marks;
mod mirror;
mod playback;
mod session;
mod time;

pub use {
    clock::{ClockState, ElapsedClock},
    error::{EngineError, PersistFailure, PersistItem, Result as CoreResult},
    extend::{
        ExtensionOutcome, ExtensionReconciler, MergeService, RecordingId, RecordingStore,
        offset_mark,
    },
    marks::{ImageRef, Mark, MarkToggle, MarkTracker, PendingMark, VideoRef},
    mirror::{OverlayDisplay, OverlayMirror, OverlayUpdate},
    playback::{LoopPlaybackController, LoopRegion, MediaBackend, PLAYBACK_RATES},
    session::{
        CaptureDevice, MediaHandle, RecordingSession, SessionOutput, SessionSnapshot, SessionState,
    },
    time::{SystemTimeSource, TimeSource},
};

#[cfg(test)]
mod tests;
