use crate::{
    CoreResult, EngineError, SessionOutput,
    error::{PersistFailure, PersistItem},
    extend::{MergeService, RecordingId, RecordingStore},
    marks::{ImageRef, Mark, VideoRef},
};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{info, instrument, warn};

/// Shift a relative mark onto the absolute timeline of the recording it
/// extends. Pure function of its inputs: the same mark and base always
/// produce the same result.
pub fn offset_mark(mark: &Mark, base_duration_seconds: f64) -> Mark {
    Mark {
        start_seconds: mark.start_seconds + base_duration_seconds,
        end_seconds: mark.end_seconds + base_duration_seconds,
        note: mark.note.clone(),
        images: mark.images.clone(),
        videos: mark.videos.clone(),
    }
}

/// What a successful reconciliation produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionOutcome {
    /// The target recording's new total duration in milliseconds.
    pub total_duration_ms: u64,
    /// How many extension marks were persisted.
    pub marks_persisted: usize,
}

/// Merges a finished extension session onto an existing recording and
/// shifts the extension's mark timestamps onto the merged timeline.
///
/// Borrows its collaborators for a single reconciliation and consumes
/// itself in [`ExtensionReconciler::reconcile`], so the merge operation can
/// be issued at most once per reconciler; re-running it would double-apply
/// the extension.
pub struct ExtensionReconciler<'a, S: RecordingStore, M: MergeService> {
    store: &'a mut S,
    merge: &'a mut M,
}

impl<'a, S: RecordingStore, M: MergeService> ExtensionReconciler<'a, S, M> {
    /// Borrow the persistence and merge collaborators for one
    /// reconciliation.
    pub fn new(store: &'a mut S, merge: &'a mut M) -> Self {
        Self { store, merge }
    }

    /// Merge `extension` onto `target` and persist the shifted marks plus
    /// any recording-level attachments collected during the extension flow.
    ///
    /// The base duration is re-read from the store here, immediately before
    /// the merge, never trusted from a value captured when the extension
    /// flow began, which eliminates stale-duration bugs by construction.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MergeFailed`] (with no writes performed) when
    /// the merge does not complete, or
    /// [`EngineError::PartialPersistence`] itemizing every write that
    /// failed after a successful merge.
    #[instrument(skip(self, extension, images, videos), fields(target = %target))]
    pub async fn reconcile(
        self,
        target: RecordingId,
        extension: &SessionOutput,
        images: &[ImageRef],
        videos: &[VideoRef],
    ) -> CoreResult<ExtensionOutcome> {
        // Authoritative read: the recording may have changed between opening
        // the extension flow and finishing the extension recording.
        let base_duration_seconds = self.store.duration_seconds(target).await?;
        let base_duration_ms = (base_duration_seconds * 1000.0).round() as u64;
        let extension_duration_ms = extension.duration_seconds * 1000;

        // Single merge call. On failure nothing has been written and the
        // extension media stays with the caller for retry.
        let total_duration_ms = self
            .merge
            .merge(target, &extension.media, base_duration_ms, extension_duration_ms)
            .await?;

        info!(
            base_duration_ms,
            extension_duration_ms, total_duration_ms, "Extension merged"
        );

        // From here on the merge has already mutated the recording, so every
        // remaining write is attempted and failures are collected rather
        // than short-circuiting: a wholesale retry would re-run the merge.
        let mut failures: Vec<PersistFailure> = Vec::new();
        let mut marks_persisted = 0;

        if let Err(e) = self.store.set_duration_ms(target, total_duration_ms).await {
            failures.push(PersistFailure {
                item: PersistItem::Duration,
                reason: e.to_string(),
            });
        }

        for mark in &extension.marks {
            let shifted = offset_mark(mark, base_duration_seconds);
            let start_seconds = shifted.start_seconds;
            match self.store.insert_mark(target, &shifted).await {
                Ok(()) => marks_persisted += 1,
                Err(e) => failures.push(PersistFailure {
                    item: PersistItem::Mark { start_seconds },
                    reason: e.to_string(),
                }),
            }
        }

        for image in images {
            if let Err(e) = self.store.insert_image(target, image).await {
                failures.push(PersistFailure {
                    item: PersistItem::RecordingImage,
                    reason: e.to_string(),
                });
            }
        }

        for video in videos {
            if let Err(e) = self.store.insert_video(target, video).await {
                failures.push(PersistFailure {
                    item: PersistItem::RecordingVideo,
                    reason: e.to_string(),
                });
            }
        }

        if !failures.is_empty() {
            warn!(
                failed = failures.len(),
                marks_persisted, "Partial persistence after successful merge"
            );
            return Err(EngineError::PartialPersistence {
                failures,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        info!(marks_persisted, "Reconciliation complete");

        Ok(ExtensionOutcome {
            total_duration_ms,
            marks_persisted,
        })
    }
}
