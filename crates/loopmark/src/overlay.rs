//! Overlay-channel publisher.
//!
//! Fans session display state out to a secondary overlay surface. Delivery
//! is at-least-once and the channel may reorder under reconnects; every
//! update carries a publisher revision so the mirror on the far side can
//! apply last-write-wins and drop duplicates.

use loopmark_core::OverlayUpdate;

use tokio::sync::mpsc;
use tracing::debug;

/// Stamps outbound overlay updates with monotonically increasing revisions.
pub struct OverlayPublisher {
    tx: mpsc::Sender<OverlayUpdate>,
    revision: u64,
}

impl OverlayPublisher {
    /// Create a publisher and the receiver end the overlay surface reads.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<OverlayUpdate>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx, revision: 0 }, rx)
    }

    /// Mirror the elapsed-duration display.
    pub fn publish_duration(&mut self, elapsed_seconds: u64) {
        let revision = self.next_revision();
        self.send(OverlayUpdate::Duration {
            revision,
            elapsed_seconds,
        });
    }

    /// Mirror the mark-open indicator.
    pub fn publish_mark_state(&mut self, mark_open: bool) {
        let revision = self.next_revision();
        self.send(OverlayUpdate::MarkState { revision, mark_open });
    }

    /// Mirror the pending-mark note text.
    pub fn publish_note(&mut self, text: Option<String>) {
        let revision = self.next_revision();
        self.send(OverlayUpdate::Note { revision, text });
    }

    fn next_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    fn send(&self, update: OverlayUpdate) {
        // Display-only mirroring: when the overlay cannot keep up, a newer
        // revision will supersede the dropped update anyway.
        if self.tx.try_send(update).is_err() {
            debug!("Overlay channel full or closed, update dropped");
        }
    }
}
