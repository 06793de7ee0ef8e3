use crate::{
    EngineError, ExtensionReconciler, ImageRef, Mark, MediaHandle, PersistItem, RecordingId,
    SessionOutput, VideoRef, offset_mark,
};

use crate::tests::support::{FakeMerge, MemoryStore};

fn extension_output(marks: Vec<Mark>, duration_seconds: u64) -> SessionOutput {
    SessionOutput {
        media: MediaHandle::new(vec![0xEE; 32]),
        marks,
        duration_seconds,
    }
}

fn mark(start: f64, end: f64) -> Mark {
    Mark {
        start_seconds: start,
        end_seconds: end,
        note: None,
        images: Vec::new(),
        videos: Vec::new(),
    }
}

/// WHAT: offset_mark is a pure function of its inputs
/// WHY: {5, 8} over a 120s base must always persist as {125, 128}
#[test]
fn given_base_duration_when_offsetting_then_deterministic_shift() {
    let relative = mark(5.0, 8.0);

    let first = offset_mark(&relative, 120.0);
    let second = offset_mark(&relative, 120.0);

    assert_eq!(first.start_seconds, 125.0);
    assert_eq!(first.end_seconds, 128.0);
    assert_eq!(first, second);
}

/// WHAT: offset_mark carries note and attachments over unchanged
#[test]
fn given_annotated_mark_when_offsetting_then_payload_preserved() {
    let image = ImageRef::new();
    let mut relative = mark(2.0, 4.0);
    relative.note = Some("bridge section".to_string());
    relative.images.push(image);

    let shifted = offset_mark(&relative, 60.0);

    assert_eq!(shifted.note.as_deref(), Some("bridge section"));
    assert_eq!(shifted.images, vec![image]);
}

/// WHAT: A successful reconciliation merges once and persists everything
#[tokio::test]
async fn given_extension_when_reconciling_then_marks_shifted_and_persisted() {
    let target = RecordingId::new();
    let mut store = MemoryStore::with_recording(target, 120_000);
    let mut merge = FakeMerge::default();
    let extension = extension_output(vec![mark(5.0, 8.0), mark(10.0, 11.0)], 30);
    let images = [ImageRef::new()];
    let videos = [VideoRef::new()];

    let outcome = ExtensionReconciler::new(&mut store, &mut merge)
        .reconcile(target, &extension, &images, &videos)
        .await
        .unwrap();

    assert_eq!(merge.calls, 1);
    assert_eq!(outcome.total_duration_ms, 150_000);
    assert_eq!(outcome.marks_persisted, 2);

    let row = &store.recordings[&target];
    assert_eq!(row.duration_ms, 150_000);
    let starts: Vec<f64> = row.marks.iter().map(|m| m.start_seconds).collect();
    assert_eq!(starts, vec![125.0, 130.0]);
    assert_eq!(row.marks[0].end_seconds, 128.0);
    assert_eq!(row.images, images);
    assert_eq!(row.videos, videos);
}

/// WHAT: The base duration is read at reconcile time, not captured earlier
/// WHY: The recording may change between opening the extension flow and
/// finishing the extension; staleness is eliminated by construction
#[tokio::test]
async fn given_duration_changed_before_commit_when_reconciling_then_fresh_value_used() {
    let target = RecordingId::new();
    let mut store = MemoryStore::with_recording(target, 100_000);
    let mut merge = FakeMerge::default();

    // The recording grows after the extension flow began
    if let Some(row) = store.recordings.get_mut(&target) {
        row.duration_ms = 120_000;
    }

    let extension = extension_output(vec![mark(5.0, 8.0)], 30);
    ExtensionReconciler::new(&mut store, &mut merge)
        .reconcile(target, &extension, &[], &[])
        .await
        .unwrap();

    // Offset by 120s, not the stale 100s
    assert_eq!(store.recordings[&target].marks[0].start_seconds, 125.0);
}

/// WHAT: A failed merge performs no persistence writes
/// WHY: The extension media stays with the caller for a clean retry
#[tokio::test]
async fn given_failing_merge_when_reconciling_then_nothing_written() {
    let target = RecordingId::new();
    let mut store = MemoryStore::with_recording(target, 120_000);
    let mut merge = FakeMerge {
        fail: true,
        ..FakeMerge::default()
    };
    let extension = extension_output(vec![mark(5.0, 8.0)], 30);

    let result = ExtensionReconciler::new(&mut store, &mut merge)
        .reconcile(target, &extension, &[ImageRef::new()], &[])
        .await;

    assert!(matches!(result, Err(EngineError::MergeFailed { .. })));
    let row = &store.recordings[&target];
    assert_eq!(row.duration_ms, 120_000);
    assert!(row.marks.is_empty());
    assert!(row.images.is_empty());
}

/// WHAT: Post-merge write failures are itemized, remaining writes attempted
/// WHY: A wholesale retry would re-run the merge and double-apply the
/// extension; callers need the list to offer a narrower retry
#[tokio::test]
async fn given_one_mark_write_failing_when_reconciling_then_itemized_partial_failure() {
    let target = RecordingId::new();
    let mut store = MemoryStore::with_recording(target, 120_000);
    // Refuse the first shifted mark (5 + 120)
    store.fail_mark_starts = vec![125.0];
    let mut merge = FakeMerge::default();
    let extension = extension_output(vec![mark(5.0, 8.0), mark(10.0, 11.0)], 30);

    let result = ExtensionReconciler::new(&mut store, &mut merge)
        .reconcile(target, &extension, &[], &[])
        .await;

    let Err(EngineError::PartialPersistence { failures, .. }) = result else {
        panic!("expected PartialPersistence, got {result:?}");
    };
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        failures[0].item,
        PersistItem::Mark { start_seconds } if start_seconds == 125.0
    ));

    // The merge still happened exactly once and the other writes landed
    assert_eq!(merge.calls, 1);
    let row = &store.recordings[&target];
    assert_eq!(row.duration_ms, 150_000);
    assert_eq!(row.marks.len(), 1);
    assert_eq!(row.marks[0].start_seconds, 130.0);
}

/// WHAT: A failed duration write is itemized alongside successful mark writes
#[tokio::test]
async fn given_duration_write_failing_when_reconciling_then_marks_still_persisted() {
    let target = RecordingId::new();
    let mut store = MemoryStore::with_recording(target, 120_000);
    store.fail_duration_write = true;
    let mut merge = FakeMerge::default();
    let extension = extension_output(vec![mark(5.0, 8.0)], 30);

    let result = ExtensionReconciler::new(&mut store, &mut merge)
        .reconcile(target, &extension, &[], &[])
        .await;

    let Err(EngineError::PartialPersistence { failures, .. }) = result else {
        panic!("expected PartialPersistence, got {result:?}");
    };
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0].item, PersistItem::Duration));
    assert_eq!(store.recordings[&target].marks.len(), 1);
}
