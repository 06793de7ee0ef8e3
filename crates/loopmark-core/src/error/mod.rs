use error_location::ErrorLocation;
use thiserror::Error;

/// Identifies a single item that failed to persist after a successful merge.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistItem {
    /// The recording's total-duration field.
    Duration,
    /// A mark, identified by its offset start time on the merged timeline.
    Mark {
        /// Start of the mark on the merged timeline, in seconds.
        start_seconds: f64,
    },
    /// A recording-level image attachment.
    RecordingImage,
    /// A recording-level video attachment.
    RecordingVideo,
}

/// One persistence write that failed during reconciliation.
///
/// Reconciliation is never retried wholesale (that would re-run the merge
/// and double-apply the extension), so callers need the itemized list to
/// offer a narrower retry.
#[derive(Debug, Clone)]
pub struct PersistFailure {
    /// What failed to persist.
    pub item: PersistItem,
    /// Human-readable reason from the persistence collaborator.
    pub reason: String,
}

/// Engine errors with source location tracking.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Capture device could not be acquired. The session stays Idle; the
    /// caller must re-invoke start, there is no automatic retry.
    #[error("Capture device unavailable: {reason} {location}")]
    CaptureUnavailable {
        /// Description from the capture collaborator.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Stop requested while no session was active.
    #[error("No active recording session {location}")]
    SessionInactive {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Playback operation attempted before any media was loaded.
    #[error("No media loaded {location}")]
    NotLoaded {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A loop region with `end <= start` was requested.
    #[error("Invalid loop region [{start}, {end}) {location}")]
    InvalidLoopRegion {
        /// Requested region start in seconds.
        start: f64,
        /// Requested region end in seconds.
        end: f64,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Media backend operation failed.
    #[error("Playback backend error: {reason} {location}")]
    Backend {
        /// Description of the backend failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Persistence collaborator operation failed.
    #[error("Store error: {reason} {location}")]
    Store {
        /// Description of the store failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// External merge operation failed. No persistence writes have occurred;
    /// the extension media is still held by the caller for retry.
    #[error("Merge failed: {reason} {location}")]
    MergeFailed {
        /// Description from the merge collaborator.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The merge succeeded but one or more persistence writes did not.
    #[error("Merge succeeded but {} item(s) failed to persist {location}", failures.len())]
    PartialPersistence {
        /// Every item that failed, so the caller can offer a narrow retry.
        failures: Vec<PersistFailure>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;
