mod device;
mod recorder;

pub use {
    device::{CaptureDevice, MediaHandle},
    recorder::{RecordingSession, SessionOutput, SessionSnapshot, SessionState},
};
