use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque handle to an image attachment held by a collaborator.
///
/// The engine never inspects pixel data; it only carries the reference
/// between the tracker and the persistence store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef(pub Uuid);

impl ImageRef {
    /// Mint a fresh reference.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImageRef {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque handle to a video attachment held by a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef(pub Uuid);

impl VideoRef {
    /// Mint a fresh reference.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VideoRef {
    fn default() -> Self {
        Self::new()
    }
}

/// An open interval: a mark that has been started but not yet closed.
///
/// At most one pending mark exists per session, owned explicitly by the
/// tracker rather than living as ambient shared state.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMark {
    /// Elapsed-seconds instant the mark was opened.
    pub start_seconds: f64,
    /// Optional annotation text.
    pub note: Option<String>,
    /// Image attachments collected while open.
    pub images: Vec<ImageRef>,
    /// Video attachments collected while open.
    pub videos: Vec<VideoRef>,
}

impl PendingMark {
    /// Open a new empty mark at the given elapsed time.
    pub fn open(start_seconds: f64) -> Self {
        Self {
            start_seconds,
            note: None,
            images: Vec::new(),
            videos: Vec::new(),
        }
    }

    /// Close this mark at `end_seconds`.
    ///
    /// Returns `None` when `end_seconds <= start_seconds`: zero-length marks
    /// are discarded by policy, not an error.
    pub fn close(self, end_seconds: f64) -> Option<Mark> {
        if end_seconds > self.start_seconds {
            Some(Mark {
                start_seconds: self.start_seconds,
                end_seconds,
                note: self.note,
                images: self.images,
                videos: self.videos,
            })
        } else {
            None
        }
    }
}

/// A closed interval `[start, end)` over the recording's timeline, with an
/// optional note and media attachments.
///
/// Invariant: `end_seconds > start_seconds` strictly. Timestamps are
/// relative (0-based from session start) until the persistence or extension
/// path shifts them onto an absolute timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    /// Interval start in elapsed seconds.
    pub start_seconds: f64,
    /// Interval end in elapsed seconds; strictly greater than the start.
    pub end_seconds: f64,
    /// Optional annotation text.
    pub note: Option<String>,
    /// Image attachments.
    pub images: Vec<ImageRef>,
    /// Video attachments.
    pub videos: Vec<VideoRef>,
}
