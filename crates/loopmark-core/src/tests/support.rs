//! Deterministic fakes shared by the engine test suites.

use crate::{
    CaptureDevice, CoreResult, EngineError, ImageRef, Mark, MediaBackend, MediaHandle,
    MergeService, RecordingId, RecordingStore, TimeSource, VideoRef,
};

use std::{
    collections::HashMap,
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use error_location::ErrorLocation;

/// Hand-cranked wall clock. Clones share the same instant.
#[derive(Debug, Clone, Default)]
pub struct ManualTime(Arc<AtomicU64>);

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now_ms: u64) {
        self.0.store(now_ms, Ordering::Relaxed);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.0.fetch_add(delta_ms, Ordering::Relaxed);
    }
}

impl TimeSource for ManualTime {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Capture device fake with a shared call log for post-hoc inspection.
#[derive(Debug, Default)]
pub struct FakeDevice {
    pub fail_acquire: bool,
    pub media: Vec<u8>,
    pub log: Arc<Mutex<Vec<String>>>,
}

impl FakeDevice {
    pub fn with_media(media: Vec<u8>) -> Self {
        Self {
            media,
            ..Self::default()
        }
    }

    fn record(&self, call: &str) {
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call.to_string());
    }
}

impl CaptureDevice for FakeDevice {
    fn acquire(&mut self) -> CoreResult<()> {
        if self.fail_acquire {
            return Err(EngineError::CaptureUnavailable {
                reason: "device busy".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.record("acquire");
        Ok(())
    }

    fn pause(&mut self) -> CoreResult<()> {
        self.record("pause");
        Ok(())
    }

    fn resume(&mut self) -> CoreResult<()> {
        self.record("resume");
        Ok(())
    }

    fn finish(&mut self) -> CoreResult<MediaHandle> {
        self.record("finish");
        Ok(MediaHandle::new(self.media.clone()))
    }

    fn release(&mut self) {
        self.record("release");
    }
}

/// Inner state of [`ScriptedBackend`], inspectable through a shared handle.
#[derive(Debug, Default)]
pub struct BackendState {
    pub loaded: bool,
    pub playing: bool,
    pub position: f64,
    pub duration: Option<f64>,
    pub rate: f64,
    pub seeks: Vec<f64>,
}

/// Media backend fake whose position the test drives by hand.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend(pub Arc<Mutex<BackendState>>);

impl ScriptedBackend {
    pub fn with_duration(duration: f64) -> Self {
        let backend = Self::default();
        backend.state().duration = Some(duration);
        backend
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MediaBackend for ScriptedBackend {
    fn load(&mut self, _handle: &MediaHandle) -> CoreResult<()> {
        self.state().loaded = true;
        Ok(())
    }

    fn play(&mut self) -> CoreResult<()> {
        self.state().playing = true;
        Ok(())
    }

    fn pause(&mut self) -> CoreResult<()> {
        self.state().playing = false;
        Ok(())
    }

    fn seek(&mut self, seconds: f64) -> CoreResult<()> {
        let mut state = self.state();
        state.position = seconds;
        state.seeks.push(seconds);
        Ok(())
    }

    fn position(&self) -> f64 {
        self.state().position
    }

    fn duration(&self) -> Option<f64> {
        self.state().duration
    }

    fn set_rate(&mut self, rate: f64) -> CoreResult<()> {
        self.state().rate = rate;
        Ok(())
    }
}

/// One persisted recording row in [`MemoryStore`].
#[derive(Debug, Default, Clone)]
pub struct StoredRecording {
    pub media: Vec<u8>,
    pub duration_ms: u64,
    pub marks: Vec<Mark>,
    pub images: Vec<ImageRef>,
    pub videos: Vec<VideoRef>,
}

/// In-memory persistence fake with injectable write failures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub recordings: HashMap<RecordingId, StoredRecording>,
    pub fail_duration_write: bool,
    pub fail_mark_starts: Vec<f64>,
}

impl MemoryStore {
    pub fn with_recording(id: RecordingId, duration_ms: u64) -> Self {
        let mut store = Self::default();
        store.recordings.insert(
            id,
            StoredRecording {
                duration_ms,
                ..StoredRecording::default()
            },
        );
        store
    }

    fn row(&self, id: RecordingId) -> CoreResult<&StoredRecording> {
        self.recordings.get(&id).ok_or_else(|| EngineError::Store {
            reason: format!("no recording {id}"),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    fn row_mut(&mut self, id: RecordingId) -> CoreResult<&mut StoredRecording> {
        self.recordings
            .get_mut(&id)
            .ok_or_else(|| EngineError::Store {
                reason: format!("no recording {id}"),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

#[async_trait]
impl RecordingStore for MemoryStore {
    async fn create_recording(
        &mut self,
        media: &MediaHandle,
        duration_ms: u64,
    ) -> CoreResult<RecordingId> {
        let id = RecordingId::new();
        self.recordings.insert(
            id,
            StoredRecording {
                media: media.as_bytes().to_vec(),
                duration_ms,
                ..StoredRecording::default()
            },
        );
        Ok(id)
    }

    async fn duration_seconds(&self, id: RecordingId) -> CoreResult<f64> {
        Ok(self.row(id)?.duration_ms as f64 / 1000.0)
    }

    async fn set_duration_ms(&mut self, id: RecordingId, total_ms: u64) -> CoreResult<()> {
        if self.fail_duration_write {
            return Err(EngineError::Store {
                reason: "duration write refused".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.row_mut(id)?.duration_ms = total_ms;
        Ok(())
    }

    async fn insert_mark(&mut self, id: RecordingId, mark: &Mark) -> CoreResult<()> {
        if self.fail_mark_starts.contains(&mark.start_seconds) {
            return Err(EngineError::Store {
                reason: format!("mark write refused at {}", mark.start_seconds),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.row_mut(id)?.marks.push(mark.clone());
        Ok(())
    }

    async fn insert_image(&mut self, id: RecordingId, image: &ImageRef) -> CoreResult<()> {
        self.row_mut(id)?.images.push(*image);
        Ok(())
    }

    async fn insert_video(&mut self, id: RecordingId, video: &VideoRef) -> CoreResult<()> {
        self.row_mut(id)?.videos.push(*video);
        Ok(())
    }
}

/// Merge fake: counts calls, optionally fails, returns base + extension.
#[derive(Debug, Default)]
pub struct FakeMerge {
    pub fail: bool,
    pub calls: u32,
}

#[async_trait]
impl MergeService for FakeMerge {
    async fn merge(
        &mut self,
        _target: RecordingId,
        _extension: &MediaHandle,
        base_duration_ms: u64,
        extension_duration_ms: u64,
    ) -> CoreResult<u64> {
        self.calls += 1;
        if self.fail {
            return Err(EngineError::MergeFailed {
                reason: "muxer exploded".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(base_duration_ms + extension_duration_ms)
    }
}
