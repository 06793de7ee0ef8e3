use crate::{
    CaptureDevice, MediaHandle,
    clock::ElapsedClock,
    marks::{ImageRef, Mark, MarkToggle, MarkTracker, VideoRef},
    time::TimeSource,
};

use std::panic::Location;

use error_location::ErrorLocation;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Recording session state machine.
///
/// `Idle → Recording ⇄ Paused → Stopped`, with reset reachable from every
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No capture in progress.
    #[default]
    Idle,
    /// Capturing; the elapsed clock is running.
    Recording,
    /// Capture suspended; elapsed time is frozen.
    Paused,
    /// Capture finalized; output has been produced.
    Stopped,
}

/// Point-in-time view of the session, published on every sampling tick for
/// listeners (main UI, overlay window) to mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionSnapshot {
    /// Current state-machine state.
    pub state: SessionState,
    /// Elapsed recording seconds (pause time excluded).
    pub elapsed_seconds: u64,
    /// Whether a mark is currently open.
    pub mark_open: bool,
}

/// Everything a finished session produced: the opaque media plus the
/// completed marks with relative (0-based) timestamps.
#[derive(Debug)]
pub struct SessionOutput {
    /// Finished media from the capture device.
    pub media: MediaHandle,
    /// Completed marks ordered by start time, timestamps relative to
    /// session start.
    pub marks: Vec<Mark>,
    /// Final elapsed duration in whole seconds.
    pub duration_seconds: u64,
}

/// Orchestrates one capture session: owns the device, the elapsed clock and
/// the mark tracker, and exposes the session's public state machine.
///
/// Exactly one session may be active at a time per capture device. All
/// mutators sample the clock and mutate the tracker in a single synchronous
/// step, so a racing pause from another input source can never interleave
/// between the time read and the mark mutation.
pub struct RecordingSession<D: CaptureDevice, T: TimeSource> {
    device: D,
    time: T,
    clock: ElapsedClock,
    marks: MarkTracker,
    state: SessionState,
    /// Start time of the completed mark the user has explicitly selected as
    /// the attachment target, if any.
    selected_mark: Option<f64>,
    updates: watch::Sender<SessionSnapshot>,
}

impl<D: CaptureDevice, T: TimeSource> RecordingSession<D, T> {
    /// Create an idle session around a capture device and a time source.
    pub fn new(device: D, time: T) -> Self {
        let (updates, _) = watch::channel(SessionSnapshot::default());
        Self {
            device,
            time,
            clock: ElapsedClock::new(),
            marks: MarkTracker::new(),
            state: SessionState::Idle,
            selected_mark: None,
            updates,
        }
    }

    /// Current state-machine state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Subscribe to snapshot updates published by [`RecordingSession::tick`].
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    /// Elapsed recording seconds at this instant.
    pub fn elapsed_seconds(&self) -> u64 {
        self.clock.elapsed_seconds(self.time.now_ms())
    }

    /// Completed marks so far, ordered by start time.
    pub fn completed_marks(&self) -> &[Mark] {
        self.marks.completed()
    }

    /// Acquire the capture device and begin recording from a fresh timeline.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::CaptureUnavailable`] when the device
    /// cannot be acquired; the session stays Idle and the caller must
    /// re-invoke start.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&mut self) -> crate::CoreResult<()> {
        if self.state == SessionState::Recording || self.state == SessionState::Paused {
            warn!(state = ?self.state, "start ignored, session already active");
            return Ok(());
        }

        self.device.acquire()?;

        self.clock.reset();
        self.marks.reset();
        self.selected_mark = None;
        self.clock.start(self.time.now_ms());
        self.state = SessionState::Recording;
        self.publish();

        info!("Recording started");

        Ok(())
    }

    /// Suspend the elapsed clock and forward pause to the device.
    ///
    /// No-op unless Recording.
    #[instrument(skip(self))]
    pub fn pause(&mut self) -> crate::CoreResult<()> {
        if self.state != SessionState::Recording {
            debug!(state = ?self.state, "pause ignored");
            return Ok(());
        }

        self.clock.pause(self.time.now_ms());
        self.device.pause()?;
        self.state = SessionState::Paused;
        self.publish();

        info!(elapsed_seconds = self.elapsed_seconds(), "Recording paused");

        Ok(())
    }

    /// Restart the elapsed clock and forward resume to the device.
    ///
    /// No-op unless Paused.
    #[instrument(skip(self))]
    pub fn resume(&mut self) -> crate::CoreResult<()> {
        if self.state != SessionState::Paused {
            debug!(state = ?self.state, "resume ignored");
            return Ok(());
        }

        self.clock.resume(self.time.now_ms());
        self.device.resume()?;
        self.state = SessionState::Recording;
        self.publish();

        info!("Recording resumed");

        Ok(())
    }

    /// Open a mark, or close the pending one, at the current elapsed time.
    ///
    /// No-op outside Recording/Paused. The clock read and the tracker
    /// mutation happen in one synchronous step.
    pub fn toggle_mark(&mut self) -> Option<MarkToggle> {
        if !self.is_active() {
            debug!(state = ?self.state, "toggle_mark ignored");
            return None;
        }

        let now_seconds = self.elapsed_seconds() as f64;
        let toggle = self.marks.toggle_mark(now_seconds);
        self.publish();
        Some(toggle)
    }

    /// Set the note on the pending mark. Returns false when no mark is open,
    /// so callers do not mirror a note that never landed.
    pub fn set_note(&mut self, text: impl Into<String>) -> bool {
        self.marks.set_note(text)
    }

    /// Select a completed mark (by start time) as the attachment target.
    pub fn select_mark(&mut self, start_seconds: f64) {
        self.selected_mark = Some(start_seconds);
    }

    /// Clear any explicit attachment-target selection.
    pub fn clear_selection(&mut self) {
        self.selected_mark = None;
    }

    /// Attach an image using the resolution policy: pending mark first,
    /// then the user-selected completed mark, then the most recently
    /// completed mark. Returns false when no target exists.
    pub fn attach_image(&mut self, image: ImageRef) -> bool {
        if self.marks.attach_image_to_pending(image) {
            return true;
        }
        if let Some(start) = self.selected_mark
            && self.marks.attach_image_at(start, image)
        {
            return true;
        }
        if let Some(start) = self.marks.last_completed_start() {
            return self.marks.attach_image_at(start, image);
        }
        debug!("attach_image dropped, no mark to attach to");
        false
    }

    /// Attach a video using the same resolution policy as
    /// [`RecordingSession::attach_image`].
    pub fn attach_video(&mut self, video: VideoRef) -> bool {
        if self.marks.attach_video_to_pending(video) {
            return true;
        }
        if let Some(start) = self.selected_mark
            && self.marks.attach_video_at(start, video)
        {
            return true;
        }
        if let Some(start) = self.marks.last_completed_start() {
            return self.marks.attach_video_at(start, video);
        }
        debug!("attach_video dropped, no mark to attach to");
        false
    }

    /// Remove an image from the completed mark starting at `start_seconds`.
    pub fn remove_image(&mut self, start_seconds: f64, index: usize) {
        self.marks.remove_image(start_seconds, index);
    }

    /// Remove a video from the completed mark starting at `start_seconds`.
    pub fn remove_video(&mut self, start_seconds: f64, index: usize) {
        self.marks.remove_video(start_seconds, index);
    }

    /// Sample elapsed time and publish a snapshot for listeners.
    ///
    /// The snapshot is display-only; the authoritative elapsed value is
    /// recomputed from the clock on every call, so missed or jittered ticks
    /// never accumulate drift.
    pub fn tick(&mut self) -> SessionSnapshot {
        let snapshot = self.snapshot();
        let _ = self.updates.send(snapshot);
        snapshot
    }

    /// Finalize capture, auto-close any pending mark at the final elapsed
    /// time, and hand back the session output with relative timestamps.
    ///
    /// # Errors
    ///
    /// Returns an error when the device fails to finalize; the session keeps
    /// its state so the caller may retry stopping.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> crate::CoreResult<SessionOutput> {
        if !self.is_active() {
            return Err(crate::EngineError::SessionInactive {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let now_ms = self.time.now_ms();
        self.clock.pause(now_ms);

        let media = self.device.finish()?;

        let final_seconds = self.clock.elapsed_seconds(now_ms);
        let marks = self.marks.finish(final_seconds as f64);
        self.state = SessionState::Stopped;
        self.publish();

        info!(
            duration_seconds = final_seconds,
            mark_count = marks.len(),
            media_bytes = media.len(),
            "Recording stopped"
        );

        Ok(SessionOutput {
            media,
            marks,
            duration_seconds: final_seconds,
        })
    }

    /// Tear everything down and return to Idle. Reachable from any state.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.device.release();
        self.clock.reset();
        self.marks.reset();
        self.selected_mark = None;
        self.state = SessionState::Idle;
        self.publish();

        debug!("Session reset");
    }

    fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Recording | SessionState::Paused)
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            elapsed_seconds: self.elapsed_seconds(),
            mark_open: self.marks.has_pending(),
        }
    }

    fn publish(&self) {
        let _ = self.updates.send(self.snapshot());
    }
}
