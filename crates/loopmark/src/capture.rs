//! Chunk-buffering capture device.
//!
//! Platform capture layers (microphone, screen, webcam) deliver encoded
//! chunks through a [`ChunkWriter`] handle from their own callback threads;
//! the device buffers them and hands the finished blob to the session as an
//! opaque [`MediaHandle`].

use std::{
    collections::VecDeque,
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use error_location::ErrorLocation;
use loopmark_core::{CaptureDevice, CoreResult, EngineError, MediaHandle};
use tracing::{debug, error, info};

/// Maximum bytes to buffer (hard upper bound on one recording's in-memory
/// media). Oldest chunks are dropped beyond this; typical recordings stay
/// well under it.
pub(crate) const MAX_BUFFER_BYTES: usize = 1024 * 1024 * 1024;

/// Cloneable handle the platform capture feed writes chunks through.
#[derive(Debug, Clone)]
pub struct ChunkWriter {
    chunks: Arc<Mutex<VecDeque<u8>>>,
    shutdown: Arc<AtomicBool>,
    gated: Arc<AtomicBool>,
}

impl ChunkWriter {
    /// Append one captured chunk.
    ///
    /// Chunks arriving after the device finished, or while capture is
    /// paused, are dropped. The flags are checked before acquiring the
    /// lock so a straggling callback can never write after `finish()`
    /// drained the buffer.
    pub fn push(&self, data: &[u8]) {
        if self.shutdown.load(Ordering::Acquire) || self.gated.load(Ordering::Acquire) {
            return;
        }
        // Recover from lock poison rather than silently dropping media.
        // A poisoned mutex means a previous holder panicked, but the
        // VecDeque data is still valid and usable.
        let mut buf = self.chunks.lock().unwrap_or_else(|e| {
            error!("Chunk buffer lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        buf.extend(data.iter().copied());
        // Ring buffer: O(1) amortized drop of oldest bytes via VecDeque
        while buf.len() > MAX_BUFFER_BYTES {
            buf.pop_front();
        }
    }
}

/// Capture device that accumulates chunks pushed by a platform feed.
///
/// One session per device: a second `acquire()` while the first is live
/// surfaces as `CaptureUnavailable`.
#[derive(Debug, Default)]
pub struct ChunkBufferDevice {
    chunks: Arc<Mutex<VecDeque<u8>>>,
    shutdown: Arc<AtomicBool>,
    gated: Arc<AtomicBool>,
    acquired: bool,
}

impl ChunkBufferDevice {
    /// Create an idle device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for the platform feed to push chunks through.
    pub fn writer(&self) -> ChunkWriter {
        ChunkWriter {
            chunks: Arc::clone(&self.chunks),
            shutdown: Arc::clone(&self.shutdown),
            gated: Arc::clone(&self.gated),
        }
    }

    fn lock_chunks(&self) -> std::sync::MutexGuard<'_, VecDeque<u8>> {
        self.chunks.lock().unwrap_or_else(|e| {
            error!("Chunk buffer lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}

impl CaptureDevice for ChunkBufferDevice {
    #[track_caller]
    fn acquire(&mut self) -> CoreResult<()> {
        if self.acquired {
            return Err(EngineError::CaptureUnavailable {
                reason: "capture device already in use".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.shutdown.store(false, Ordering::Release);
        self.gated.store(false, Ordering::Release);
        self.lock_chunks().clear();
        self.acquired = true;

        info!("Capture device acquired");

        Ok(())
    }

    fn pause(&mut self) -> CoreResult<()> {
        self.gated.store(true, Ordering::Release);
        Ok(())
    }

    fn resume(&mut self) -> CoreResult<()> {
        self.gated.store(false, Ordering::Release);
        Ok(())
    }

    fn finish(&mut self) -> CoreResult<MediaHandle> {
        // Signal writers to stop BEFORE draining, so a straggling feed
        // callback observes the flag and returns without writing.
        self.shutdown.store(true, Ordering::Release);

        let bytes: Vec<u8> = self.lock_chunks().drain(..).collect();
        self.acquired = false;

        info!(byte_len = bytes.len(), "Capture finished");

        Ok(MediaHandle::new(bytes))
    }

    fn release(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        self.lock_chunks().clear();
        self.acquired = false;

        debug!("Capture device released");
    }
}
