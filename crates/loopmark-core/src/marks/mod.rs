mod mark;
mod tracker;

pub use {
    mark::{ImageRef, Mark, PendingMark, VideoRef},
    tracker::{MarkToggle, MarkTracker},
};
