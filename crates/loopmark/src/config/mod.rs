#[allow(clippy::module_inception)]
mod config;
mod library_config;
mod playback_config;
mod session_config;

pub(crate) use {
    config::Config, library_config::LibraryConfig, playback_config::PlaybackConfig,
    session_config::SessionConfig,
};

pub(crate) const DEFAULT_SESSION_TICK_MS: u64 = 100;
pub(crate) const DEFAULT_PLAYBACK_POLL_MS: u64 = 50;

pub(crate) fn default_session_tick_ms() -> u64 {
    DEFAULT_SESSION_TICK_MS
}

pub(crate) fn default_playback_poll_ms() -> u64 {
    DEFAULT_PLAYBACK_POLL_MS
}
