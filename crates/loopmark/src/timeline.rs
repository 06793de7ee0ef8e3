//! Timing-model media backend.
//!
//! Advances a play head in wall-clock time at the current rate without
//! decoding anything. This is the backend the headless shell runs against;
//! a platform audio/video backend implements the same [`MediaBackend`]
//! trait and swaps in transparently.

use std::time::Instant;

use loopmark_core::{CoreResult, MediaBackend, MediaHandle};

/// Play-head model over an opaque media blob.
#[derive(Debug, Default)]
pub struct TimelineBackend {
    duration: Option<f64>,
    /// Position at the last play/seek/rate transition.
    base_position: f64,
    /// Set while playing; the head is base + elapsed-since * rate.
    playing_since: Option<Instant>,
    rate: f64,
}

impl TimelineBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self {
            rate: 1.0,
            ..Self::default()
        }
    }

    /// Fold the running segment into the base position.
    fn checkpoint(&mut self) {
        self.base_position = self.position();
        if self.playing_since.is_some() {
            self.playing_since = Some(Instant::now());
        }
    }
}

impl MediaBackend for TimelineBackend {
    fn load(&mut self, _handle: &MediaHandle) -> CoreResult<()> {
        // Opaque blobs carry no trustworthy container metadata; the
        // controller supplies the known duration instead.
        self.duration = None;
        self.base_position = 0.0;
        self.playing_since = None;
        self.rate = 1.0;
        Ok(())
    }

    fn play(&mut self) -> CoreResult<()> {
        if self.playing_since.is_none() {
            self.playing_since = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) -> CoreResult<()> {
        self.base_position = self.position();
        self.playing_since = None;
        Ok(())
    }

    fn seek(&mut self, seconds: f64) -> CoreResult<()> {
        self.base_position = seconds;
        if self.playing_since.is_some() {
            self.playing_since = Some(Instant::now());
        }
        Ok(())
    }

    fn position(&self) -> f64 {
        let running = self
            .playing_since
            .map(|since| since.elapsed().as_secs_f64() * self.rate)
            .unwrap_or(0.0);
        let position = self.base_position + running;
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn set_rate(&mut self, rate: f64) -> CoreResult<()> {
        // Checkpoint first so the rate change never jumps the play head.
        self.checkpoint();
        self.rate = rate;
        Ok(())
    }
}
