//! In-memory recording library.
//!
//! Implements both persistence ([`RecordingStore`]) and the merge
//! collaborator ([`MergeService`]) over one shared map, so a clone of the
//! library can serve each seam. Writes to a given recording are serialized
//! by the interior lock, per the store contract.

use std::{
    collections::HashMap,
    fs,
    panic::Location,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use loopmark_core::{
    CoreResult, EngineError, ImageRef, Mark, MediaHandle, MergeService, RecordingId,
    RecordingStore, VideoRef,
};
use tracing::{debug, error, info, warn};

/// One stored recording.
#[derive(Debug, Default, Clone)]
pub struct RecordingRow {
    /// Opaque media bytes.
    pub media: Vec<u8>,
    /// Total duration in milliseconds.
    pub duration_ms: u64,
    /// Marks with absolute timestamps.
    pub marks: Vec<Mark>,
    /// Recording-level image attachments.
    pub images: Vec<ImageRef>,
    /// Recording-level video attachments.
    pub videos: Vec<VideoRef>,
}

/// Cloneable in-memory store shared between the shell and the reconciler.
///
/// When built with a root directory, finished media is mirrored to
/// `<root>/<id>.bin` so recordings survive the process; the in-memory map
/// stays authoritative.
#[derive(Debug, Clone, Default)]
pub struct MemoryLibrary {
    rows: Arc<Mutex<HashMap<RecordingId, RecordingRow>>>,
    root: Option<PathBuf>,
}

impl MemoryLibrary {
    /// Create an empty library with no disk mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library that mirrors finished media into `root`.
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            rows: Arc::default(),
            root: Some(root),
        }
    }

    /// Read a snapshot of one recording, if present.
    pub fn recording(&self, id: RecordingId) -> Option<RecordingRow> {
        self.lock_rows().get(&id).cloned()
    }

    /// Identifiers of every stored recording.
    pub fn recording_ids(&self) -> Vec<RecordingId> {
        self.lock_rows().keys().copied().collect()
    }

    fn media_path(&self, id: RecordingId) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join(format!("{id}.bin")))
    }

    fn lock_rows(&self) -> MutexGuard<'_, HashMap<RecordingId, RecordingRow>> {
        self.rows.lock().unwrap_or_else(|e| {
            error!("Library lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    #[track_caller]
    fn missing(id: RecordingId) -> EngineError {
        EngineError::Store {
            reason: format!("no recording {id}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

#[async_trait]
impl RecordingStore for MemoryLibrary {
    async fn create_recording(
        &mut self,
        media: &MediaHandle,
        duration_ms: u64,
    ) -> CoreResult<RecordingId> {
        let id = RecordingId::new();

        // Mirror to disk before the row exists, so a failed write cannot
        // leave a recording without its media file.
        if let Some(path) = self.media_path(id) {
            fs::write(&path, media.as_bytes()).map_err(|e| EngineError::Store {
                reason: format!("failed to write media file: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;
        }

        self.lock_rows().insert(
            id,
            RecordingRow {
                media: media.as_bytes().to_vec(),
                duration_ms,
                ..RecordingRow::default()
            },
        );

        info!(recording = %id, duration_ms, "Recording created");

        Ok(id)
    }

    async fn duration_seconds(&self, id: RecordingId) -> CoreResult<f64> {
        self.lock_rows()
            .get(&id)
            .map(|row| row.duration_ms as f64 / 1000.0)
            .ok_or_else(|| Self::missing(id))
    }

    async fn set_duration_ms(&mut self, id: RecordingId, total_ms: u64) -> CoreResult<()> {
        let mut rows = self.lock_rows();
        let row = rows.get_mut(&id).ok_or_else(|| Self::missing(id))?;
        row.duration_ms = total_ms;
        Ok(())
    }

    async fn insert_mark(&mut self, id: RecordingId, mark: &Mark) -> CoreResult<()> {
        let mut rows = self.lock_rows();
        let row = rows.get_mut(&id).ok_or_else(|| Self::missing(id))?;
        row.marks.push(mark.clone());
        debug!(recording = %id, start_seconds = mark.start_seconds, "Mark persisted");
        Ok(())
    }

    async fn insert_image(&mut self, id: RecordingId, image: &ImageRef) -> CoreResult<()> {
        let mut rows = self.lock_rows();
        let row = rows.get_mut(&id).ok_or_else(|| Self::missing(id))?;
        row.images.push(*image);
        Ok(())
    }

    async fn insert_video(&mut self, id: RecordingId, video: &VideoRef) -> CoreResult<()> {
        let mut rows = self.lock_rows();
        let row = rows.get_mut(&id).ok_or_else(|| Self::missing(id))?;
        row.videos.push(*video);
        Ok(())
    }
}

#[async_trait]
impl MergeService for MemoryLibrary {
    async fn merge(
        &mut self,
        target: RecordingId,
        extension: &MediaHandle,
        base_duration_ms: u64,
        extension_duration_ms: u64,
    ) -> CoreResult<u64> {
        let mut rows = self.lock_rows();
        let row = rows.get_mut(&target).ok_or_else(|| EngineError::MergeFailed {
            reason: format!("no recording {target} to merge into"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        row.media.extend_from_slice(extension.as_bytes());
        let total_ms = base_duration_ms + extension_duration_ms;

        // The in-memory state is authoritative; the disk mirror is refreshed
        // best-effort after a merge.
        if let Some(path) = self.media_path(target)
            && let Err(e) = fs::write(&path, &row.media)
        {
            warn!(recording = %target, error = %e, "Media mirror refresh failed");
        }

        info!(
            recording = %target,
            base_duration_ms,
            extension_duration_ms,
            total_ms,
            "Media merged"
        );

        Ok(total_ms)
    }
}
