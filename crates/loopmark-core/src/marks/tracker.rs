use crate::marks::{ImageRef, Mark, PendingMark, VideoRef};

use tracing::{debug, info};

/// Outcome of a [`MarkTracker::toggle_mark`] call, so callers can mirror
/// the state change to secondary surfaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkToggle {
    /// A new pending mark was opened at the given elapsed time.
    Opened {
        /// Start of the new pending mark.
        start_seconds: f64,
    },
    /// The pending mark was closed and appended to the completed list.
    Closed {
        /// Start of the completed mark.
        start_seconds: f64,
        /// End of the completed mark.
        end_seconds: f64,
    },
    /// The pending mark was closed with `end <= start` and dropped.
    Discarded {
        /// Start of the discarded mark.
        start_seconds: f64,
    },
}

/// Manages the single pending (open) interval and the ordered list of
/// completed intervals for one recording session.
///
/// Completed marks stay ordered by start time without sorting: marks close
/// in the order they open, and start times are monotonic with elapsed time.
/// Start times are therefore unique within a session, which is what makes
/// start-time lookup (`attach_image_at` etc.) sound.
///
/// Priority ordering between "pending", "user-selected" and "most recent"
/// attachment targets is caller policy; the tracker only implements
/// attach-to-pending and attach-by-start-time.
#[derive(Debug, Default)]
pub struct MarkTracker {
    pending: Option<PendingMark>,
    completed: Vec<Mark>,
}

impl MarkTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a mark is currently open.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Start time of the pending mark, if one is open.
    pub fn pending_start(&self) -> Option<f64> {
        self.pending.as_ref().map(|p| p.start_seconds)
    }

    /// Completed marks, ordered by start time ascending.
    pub fn completed(&self) -> &[Mark] {
        &self.completed
    }

    /// Start time of the most recently completed mark.
    pub fn last_completed_start(&self) -> Option<f64> {
        self.completed.last().map(|m| m.start_seconds)
    }

    /// Open a mark if none is pending, otherwise close the pending one at
    /// `now_seconds`.
    ///
    /// A close with `now_seconds <= start` discards the mark silently;
    /// zero-length marks are a policy decision, not an error.
    pub fn toggle_mark(&mut self, now_seconds: f64) -> MarkToggle {
        match self.pending.take() {
            None => {
                self.pending = Some(PendingMark::open(now_seconds));
                debug!(start_seconds = now_seconds, "Mark opened");
                MarkToggle::Opened {
                    start_seconds: now_seconds,
                }
            }
            Some(pending) => {
                let start_seconds = pending.start_seconds;
                match pending.close(now_seconds) {
                    Some(mark) => {
                        let end_seconds = mark.end_seconds;
                        self.completed.push(mark);
                        info!(start_seconds, end_seconds, "Mark completed");
                        MarkToggle::Closed {
                            start_seconds,
                            end_seconds,
                        }
                    }
                    None => {
                        debug!(start_seconds, "Zero-length mark discarded");
                        MarkToggle::Discarded { start_seconds }
                    }
                }
            }
        }
    }

    /// Set the note on the pending mark. Returns false when none is open.
    pub fn set_note(&mut self, text: impl Into<String>) -> bool {
        match self.pending.as_mut() {
            Some(pending) => {
                pending.note = Some(text.into());
                true
            }
            None => false,
        }
    }

    /// Attach an image to the pending mark. Returns false when none is open.
    pub fn attach_image_to_pending(&mut self, image: ImageRef) -> bool {
        match self.pending.as_mut() {
            Some(pending) => {
                pending.images.push(image);
                true
            }
            None => false,
        }
    }

    /// Attach a video to the pending mark. Returns false when none is open.
    pub fn attach_video_to_pending(&mut self, video: VideoRef) -> bool {
        match self.pending.as_mut() {
            Some(pending) => {
                pending.videos.push(video);
                true
            }
            None => false,
        }
    }

    /// Attach an image to the completed mark that started at `start_seconds`.
    /// Returns false when no such mark exists.
    pub fn attach_image_at(&mut self, start_seconds: f64, image: ImageRef) -> bool {
        match self.completed_at_mut(start_seconds) {
            Some(mark) => {
                mark.images.push(image);
                true
            }
            None => false,
        }
    }

    /// Attach a video to the completed mark that started at `start_seconds`.
    /// Returns false when no such mark exists.
    pub fn attach_video_at(&mut self, start_seconds: f64, video: VideoRef) -> bool {
        match self.completed_at_mut(start_seconds) {
            Some(mark) => {
                mark.videos.push(video);
                true
            }
            None => false,
        }
    }

    /// Remove the image at `index` from the completed mark starting at
    /// `start_seconds`; no-op when the mark or index is not found.
    pub fn remove_image(&mut self, start_seconds: f64, index: usize) {
        if let Some(mark) = self.completed_at_mut(start_seconds)
            && index < mark.images.len()
        {
            mark.images.remove(index);
        }
    }

    /// Remove the video at `index` from the completed mark starting at
    /// `start_seconds`; no-op when the mark or index is not found.
    pub fn remove_video(&mut self, start_seconds: f64, index: usize) {
        if let Some(mark) = self.completed_at_mut(start_seconds)
            && index < mark.videos.len()
        {
            mark.videos.remove(index);
        }
    }

    /// Auto-close any still-pending mark at the session's final elapsed time
    /// (same zero-length discard rule) and return the completed list.
    pub fn finish(&mut self, final_elapsed_seconds: f64) -> Vec<Mark> {
        if self.pending.is_some() {
            let _ = self.toggle_mark(final_elapsed_seconds);
        }
        std::mem::take(&mut self.completed)
    }

    /// Drop everything, pending and completed.
    pub fn reset(&mut self) {
        self.pending = None;
        self.completed.clear();
    }

    fn completed_at_mut(&mut self, start_seconds: f64) -> Option<&mut Mark> {
        self.completed
            .iter_mut()
            .find(|m| m.start_seconds == start_seconds)
    }
}
