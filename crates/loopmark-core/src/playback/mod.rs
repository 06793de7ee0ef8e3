mod backend;
mod controller;

pub use {
    backend::MediaBackend,
    controller::{LoopPlaybackController, LoopRegion, PLAYBACK_RATES},
};
