use crate::CoreResult;

/// Opaque handle to finished media produced by a capture device.
///
/// The engine never decodes these bytes; they travel untouched from the
/// capture collaborator to the persistence and merge collaborators.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaHandle {
    bytes: Vec<u8>,
}

impl MediaHandle {
    /// Wrap captured bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The raw media bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of media bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the handle holds no media at all.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for MediaHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Media blobs can run to gigabytes; never dump them into logs.
        f.debug_struct("MediaHandle")
            .field("byte_len", &self.bytes.len())
            .finish()
    }
}

/// Capture collaborator contract.
///
/// Implementations own the platform capture stream (microphone, screen,
/// webcam) and deliver chunked data internally; the session only drives the
/// lifecycle and collects the finished handle.
pub trait CaptureDevice {
    /// Acquire the device and begin capturing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::CaptureUnavailable`] when the device
    /// cannot be acquired; the session stays Idle and does not retry.
    fn acquire(&mut self) -> CoreResult<()>;

    /// Pause capture if the device supports it. Default is a no-op
    /// passthrough for devices that keep capturing and discard on trim.
    fn pause(&mut self) -> CoreResult<()> {
        Ok(())
    }

    /// Resume capture after [`CaptureDevice::pause`]. Default no-op.
    fn resume(&mut self) -> CoreResult<()> {
        Ok(())
    }

    /// Finalize capture and hand back the finished media.
    ///
    /// # Errors
    ///
    /// Returns an error when the capture stream cannot be finalized.
    fn finish(&mut self) -> CoreResult<MediaHandle>;

    /// Release the device without producing media (session reset/teardown).
    fn release(&mut self);
}
