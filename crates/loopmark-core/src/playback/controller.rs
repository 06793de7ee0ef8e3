use crate::{CoreResult, EngineError, MediaHandle, playback::MediaBackend};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};

/// Playback-rate presets, cycled in ascending order with wraparound.
pub const PLAYBACK_RATES: [f64; 8] = [0.75, 1.0, 1.25, 1.5, 1.75, 2.0, 2.5, 3.0];

/// Index into [`PLAYBACK_RATES`] for the normal 1.0 rate.
const NORMAL_RATE_INDEX: usize = 1;

/// The interval the controller is currently constrained to repeat, in
/// absolute seconds on the loaded media's timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopRegion {
    /// Region start, inclusive.
    pub start: f64,
    /// Region end, exclusive; strictly greater than the start.
    pub end: f64,
}

/// Drives continuous media playback and enforces a selected interval as a
/// seek-loop.
///
/// The backend has no seamless-loop primitive, so the app samples
/// [`LoopPlaybackController::poll`] on a fixed tick (~50 ms). The loop may
/// overshoot the region end by up to one tick of playback before the
/// correcting seek; that is accepted jitter, not a bug.
///
/// Callers must serialize region changes: issue a new `set_loop_region` only
/// after the previous one has taken effect, since overlapping
/// stop/seek/play sequences have no guaranteed completion order.
pub struct LoopPlaybackController<B: MediaBackend> {
    backend: B,
    loaded: bool,
    duration: Option<f64>,
    region: Option<LoopRegion>,
    rate_index: usize,
    playing: bool,
}

impl<B: MediaBackend> LoopPlaybackController<B> {
    /// Create a controller around a media backend with nothing loaded.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            loaded: false,
            duration: None,
            region: None,
            rate_index: NORMAL_RATE_INDEX,
            playing: false,
        }
    }

    /// Prepare media for playback, paused at position zero.
    ///
    /// A caller-supplied duration wins over backend metadata (needed for
    /// opaque blob sources whose container metadata may be unreliable);
    /// otherwise the duration is taken from the backend once it reports one.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot open the media.
    #[track_caller]
    #[instrument(skip(self, handle))]
    pub fn load(&mut self, handle: &MediaHandle, known_duration: Option<f64>) -> CoreResult<()> {
        self.backend.load(handle)?;
        self.loaded = true;
        self.duration = known_duration.or_else(|| self.backend.duration());
        self.region = None;
        // Backends reset their own rate on load; keep the preset in step.
        self.rate_index = NORMAL_RATE_INDEX;
        self.playing = false;

        info!(
            media_bytes = handle.len(),
            duration_seconds = ?self.duration,
            "Media loaded"
        );

        Ok(())
    }

    /// Whether playback is currently running.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// The active loop region, if any.
    pub fn region(&self) -> Option<LoopRegion> {
        self.region
    }

    /// Current play-head position in seconds.
    pub fn position(&self) -> f64 {
        self.backend.position()
    }

    /// Resolved media duration, if known yet.
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Current playback rate.
    pub fn rate(&self) -> f64 {
        PLAYBACK_RATES[self.rate_index]
    }

    /// Play if paused, pause if playing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotLoaded`] before media is loaded, or the
    /// backend's error.
    #[track_caller]
    pub fn toggle(&mut self) -> CoreResult<()> {
        self.ensure_loaded()?;

        if self.playing {
            self.backend.pause()?;
            self.playing = false;
        } else {
            self.backend.play()?;
            self.playing = true;
        }
        Ok(())
    }

    /// Constrain playback to `[start, end)`, replacing any prior region.
    ///
    /// The stop → seek(start) → play sequence is deliberate: it guarantees a
    /// clean backend state even under rapid repeated region changes, where
    /// seeking a live stream in place can leave stale buffered state or
    /// audible glitches.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidLoopRegion`] when `end <= start`,
    /// [`EngineError::NotLoaded`] before media is loaded, or the backend's
    /// error.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn set_loop_region(&mut self, start: f64, end: f64) -> CoreResult<()> {
        self.ensure_loaded()?;

        if end <= start {
            return Err(EngineError::InvalidLoopRegion {
                start,
                end,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.playing {
            self.backend.pause()?;
            self.playing = false;
        }
        self.backend.seek(start)?;
        self.backend.play()?;
        self.playing = true;
        self.region = Some(LoopRegion { start, end });

        info!(start, end, "Loop region set");

        Ok(())
    }

    /// Remove the active region and pause playback.
    ///
    /// # Errors
    ///
    /// Returns the backend's error when pausing fails.
    #[instrument(skip(self))]
    pub fn clear_loop_region(&mut self) -> CoreResult<()> {
        self.region = None;
        if self.playing {
            self.backend.pause()?;
            self.playing = false;
        }

        debug!("Loop region cleared");

        Ok(())
    }

    /// Boundary tick: when a region is active and the play head has reached
    /// or passed its end, seek back to the region start without pausing.
    ///
    /// Also resolves the duration lazily once the backend reports one.
    ///
    /// # Errors
    ///
    /// Returns the backend's error when the correcting seek fails.
    pub fn poll(&mut self) -> CoreResult<()> {
        if self.duration.is_none() {
            self.duration = self.backend.duration();
        }

        if self.playing
            && let Some(region) = self.region
            && self.backend.position() >= region.end
        {
            debug!(
                position = self.backend.position(),
                start = region.start,
                "Loop boundary crossed, seeking back"
            );
            self.backend.seek(region.start)?;
        }
        Ok(())
    }

    /// Advance to the next rate preset, wrapping from the last back to the
    /// first. Takes effect immediately without interrupting position.
    ///
    /// # Errors
    ///
    /// Returns the backend's error when it rejects the rate.
    #[track_caller]
    pub fn cycle_rate(&mut self) -> CoreResult<f64> {
        let next = (self.rate_index + 1) % PLAYBACK_RATES.len();
        let rate = PLAYBACK_RATES[next];
        self.backend.set_rate(rate)?;
        self.rate_index = next;

        debug!(rate, "Playback rate changed");

        Ok(rate)
    }

    /// Direct scrub to an absolute position, clamped to `[0, duration]`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotLoaded`] before media is loaded, or the
    /// backend's error.
    #[track_caller]
    pub fn seek(&mut self, to_seconds: f64) -> CoreResult<()> {
        self.ensure_loaded()?;

        let mut target = to_seconds.max(0.0);
        if let Some(duration) = self.duration {
            target = target.min(duration);
        }
        self.backend.seek(target)
    }

    #[track_caller]
    fn ensure_loaded(&self) -> CoreResult<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(EngineError::NotLoaded {
                location: ErrorLocation::from(Location::caller()),
            })
        }
    }
}
