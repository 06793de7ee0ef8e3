use crate::{CoreResult, MediaHandle};

/// Playback collaborator contract.
///
/// The backend is a continuous media player with no native "loop within
/// [a, b]" primitive; the controller builds looping on top of seek plus
/// position polling.
pub trait MediaBackend {
    /// Prepare the given media for playback, replacing any prior media.
    ///
    /// # Errors
    ///
    /// Returns an error when the media cannot be opened.
    fn load(&mut self, handle: &MediaHandle) -> CoreResult<()>;

    /// Begin or continue playback.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot start playing.
    fn play(&mut self) -> CoreResult<()>;

    /// Suspend playback, keeping position.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot pause.
    fn pause(&mut self) -> CoreResult<()>;

    /// Move the play head to an absolute position in seconds.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot seek.
    fn seek(&mut self, seconds: f64) -> CoreResult<()>;

    /// Current play-head position in seconds.
    fn position(&self) -> f64;

    /// Media duration in seconds, once the backend has resolved it.
    /// Container metadata on opaque blob sources may be unreliable or
    /// late, hence the `Option`.
    fn duration(&self) -> Option<f64>;

    /// Change the playback rate without disturbing position.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend rejects the rate.
    fn set_rate(&mut self, rate: f64) -> CoreResult<()>;
}
