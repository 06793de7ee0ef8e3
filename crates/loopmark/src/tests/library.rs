use crate::MemoryLibrary;

use loopmark_core::{
    EngineError, Mark, MediaHandle, MergeService, RecordingId, RecordingStore,
};

/// WHAT: A created recording reads back its media and duration
/// WHY: The store is the system of record for finished sessions
#[tokio::test]
async fn given_created_recording_when_read_then_media_and_duration_match() {
    let mut library = MemoryLibrary::new();

    let id = library
        .create_recording(&MediaHandle::new(vec![1, 2, 3]), 12_000)
        .await
        .unwrap();

    let row = library.recording(id).unwrap();
    assert_eq!(row.media, vec![1, 2, 3]);
    assert_eq!(row.duration_ms, 12_000);
    assert_eq!(library.duration_seconds(id).await.unwrap(), 12.0);
}

/// WHAT: Operations on an unknown recording fail with a store error
/// WHY: Callers need to distinguish a missing target from a write failure
#[tokio::test]
async fn given_unknown_recording_when_written_then_store_error() {
    let mut library = MemoryLibrary::new();
    let missing = RecordingId::new();

    let mark = Mark {
        start_seconds: 1.0,
        end_seconds: 2.0,
        note: None,
        images: vec![],
        videos: vec![],
    };

    assert!(matches!(
        library.insert_mark(missing, &mark).await,
        Err(EngineError::Store { .. })
    ));
    assert!(matches!(
        library.duration_seconds(missing).await,
        Err(EngineError::Store { .. })
    ));
}

/// WHAT: Merging appends the extension media and returns the summed duration
/// WHY: The reconciler trusts the merge result as the new total
#[tokio::test]
async fn given_extension_when_merged_then_media_appended_and_total_returned() {
    let mut library = MemoryLibrary::new();
    let id = library
        .create_recording(&MediaHandle::new(vec![1, 2]), 10_000)
        .await
        .unwrap();

    let total = library
        .merge(id, &MediaHandle::new(vec![3, 4, 5]), 10_000, 4_000)
        .await
        .unwrap();

    assert_eq!(total, 14_000);
    assert_eq!(library.recording(id).unwrap().media, vec![1, 2, 3, 4, 5]);
}

/// WHAT: Merging into an unknown target fails as a merge error
/// WHY: The reconciler retains the extension for retry on merge failure
#[tokio::test]
async fn given_unknown_target_when_merged_then_merge_failed() {
    let mut library = MemoryLibrary::new();

    let result = library
        .merge(RecordingId::new(), &MediaHandle::new(vec![1]), 0, 1_000)
        .await;

    assert!(matches!(result, Err(EngineError::MergeFailed { .. })));
}

/// WHAT: A library with a root directory mirrors media to disk
/// WHY: The in-memory map dies with the process; the mirror is what survives
#[tokio::test]
async fn given_root_directory_when_recording_created_then_media_mirrored_to_disk() {
    let root = std::env::temp_dir().join(format!("loopmark-lib-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&root).unwrap();

    let mut library = MemoryLibrary::with_root(root.clone());
    let id = library
        .create_recording(&MediaHandle::new(vec![8, 8]), 2_000)
        .await
        .unwrap();

    let path = root.join(format!("{id}.bin"));
    assert_eq!(std::fs::read(&path).unwrap(), vec![8, 8]);

    // A merge refreshes the mirror with the appended media
    library
        .merge(id, &MediaHandle::new(vec![9]), 2_000, 1_000)
        .await
        .unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), vec![8, 8, 9]);

    std::fs::remove_dir_all(&root).unwrap();
}

/// WHAT: Clones of the library observe each other's writes
/// WHY: The shell hands one clone to persistence and one to merging
#[tokio::test]
async fn given_cloned_library_when_one_writes_then_other_reads_it() {
    let mut writer = MemoryLibrary::new();
    let reader = writer.clone();

    let id = writer
        .create_recording(&MediaHandle::new(vec![9]), 1_000)
        .await
        .unwrap();

    assert!(reader.recording(id).is_some());
}
