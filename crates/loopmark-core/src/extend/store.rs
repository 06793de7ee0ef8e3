use crate::{
    CoreResult, MediaHandle,
    marks::{ImageRef, Mark, VideoRef},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a persisted recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordingId(pub Uuid);

impl RecordingId {
    /// Mint a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Persistence collaborator contract: CRUD for recordings, their marks and
/// their attachments.
///
/// The store is assumed to serialize writes to a given recording's marks;
/// the engine never runs two reconciliations against the same target
/// concurrently.
#[async_trait]
pub trait RecordingStore: Send {
    /// Create a recording with its media and initial duration, returning
    /// its identifier.
    async fn create_recording(
        &mut self,
        media: &MediaHandle,
        duration_ms: u64,
    ) -> CoreResult<RecordingId>;

    /// Read the recording's current, authoritative duration in seconds.
    ///
    /// Reconciliation calls this immediately before merging rather than
    /// trusting any value captured earlier in a UI flow.
    async fn duration_seconds(&self, id: RecordingId) -> CoreResult<f64>;

    /// Overwrite the recording's total duration in milliseconds.
    async fn set_duration_ms(&mut self, id: RecordingId, total_ms: u64) -> CoreResult<()>;

    /// Persist one mark (absolute timestamps) owned by the recording.
    async fn insert_mark(&mut self, id: RecordingId, mark: &Mark) -> CoreResult<()>;

    /// Persist a recording-level (not mark-level) image attachment.
    async fn insert_image(&mut self, id: RecordingId, image: &ImageRef) -> CoreResult<()>;

    /// Persist a recording-level (not mark-level) video attachment.
    async fn insert_video(&mut self, id: RecordingId, video: &VideoRef) -> CoreResult<()>;
}

/// External merge collaborator: the single point where two media streams
/// become one. The engine treats the operation as atomic and opaque, and
/// calls it at most once per reconciliation.
#[async_trait]
pub trait MergeService: Send {
    /// Append `extension` onto the end of the target recording's media and
    /// return the merged total duration in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::MergeFailed`] (or a collaborator
    /// error) when the merge does not complete; no persistence writes will
    /// have been issued by the engine in that case.
    async fn merge(
        &mut self,
        target: RecordingId,
        extension: &MediaHandle,
        base_duration_ms: u64,
        extension_duration_ms: u64,
    ) -> CoreResult<u64>;
}
