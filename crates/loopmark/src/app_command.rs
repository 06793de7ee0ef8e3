use loopmark_core::{ImageRef, RecordingId, VideoRef};

use uuid::Uuid;

/// Commands sent from input sources (keyboard, UI, overlay window) to the
/// main application loop. The loop handles them serially, which is what
/// gives racing input sources their ordering guarantees.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Start a new recording session.
    StartRecording {
        /// Unique session ID for log correlation.
        session_id: Uuid,
    },
    /// Pause the active recording session.
    PauseRecording,
    /// Resume a paused recording session.
    ResumeRecording,
    /// Stop the active recording session and persist its output.
    StopRecording {
        /// Session ID of the recording to stop.
        session_id: Uuid,
    },
    /// Open a mark, or close the pending one, at the current elapsed time.
    ToggleMark,
    /// Set the note on the pending mark.
    SetNote {
        /// Annotation text.
        text: String,
    },
    /// Attach an image to the current mark target.
    AttachImage {
        /// Opaque image reference.
        image: ImageRef,
    },
    /// Attach a video to the current mark target.
    AttachVideo {
        /// Opaque video reference.
        video: VideoRef,
    },
    /// Select a completed mark (by start time) as the attachment target.
    SelectMark {
        /// Start time of the completed mark.
        start_seconds: f64,
    },
    /// Clear the explicit attachment-target selection.
    ClearSelection,
    /// Remove an image from a completed mark.
    RemoveImage {
        /// Start time of the completed mark.
        start_seconds: f64,
        /// Index into the mark's image list.
        index: usize,
    },
    /// Remove a video from a completed mark.
    RemoveVideo {
        /// Start time of the completed mark.
        start_seconds: f64,
        /// Index into the mark's video list.
        index: usize,
    },
    /// Play if paused, pause if playing.
    TogglePlayback,
    /// Loop playback over `[start, end)`.
    PlayLoop {
        /// Region start in seconds.
        start: f64,
        /// Region end in seconds.
        end: f64,
    },
    /// Remove the loop region and pause.
    ClearLoop,
    /// Advance to the next playback-rate preset.
    CycleRate,
    /// Scrub to an absolute position.
    Seek {
        /// Target position in seconds.
        seconds: f64,
    },
    /// Begin an extension recording that will be merged onto `target`.
    ExtendRecording {
        /// Recording to extend.
        target: RecordingId,
    },
    /// Retry a reconciliation whose merge failed; the extension media is
    /// still held in memory.
    RetryExtension,
    /// Request application shutdown.
    Shutdown,
}
