mod reconciler;
mod store;

pub use {
    reconciler::{ExtensionOutcome, ExtensionReconciler, offset_mark},
    store::{MergeService, RecordingId, RecordingStore},
};
