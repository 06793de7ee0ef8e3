use crate::ChunkBufferDevice;

use loopmark_core::{CaptureDevice, EngineError};

/// WHAT: A second acquire while the device is live fails
/// WHY: One capture session per device; a double start must surface early
#[test]
fn given_acquired_device_when_acquired_again_then_capture_unavailable() {
    let mut device = ChunkBufferDevice::new();
    device.acquire().unwrap();

    let result = device.acquire();

    assert!(matches!(
        result,
        Err(EngineError::CaptureUnavailable { .. })
    ));
}

/// WHAT: Chunks pushed through the writer come back from finish
/// WHY: The session receives everything the platform feed delivered
#[test]
fn given_pushed_chunks_when_finished_then_media_contains_all_bytes() {
    let mut device = ChunkBufferDevice::new();
    let writer = device.writer();
    device.acquire().unwrap();

    writer.push(&[1, 2, 3]);
    writer.push(&[4, 5]);

    let media = device.finish().unwrap();

    assert_eq!(media.as_bytes(), &[1, 2, 3, 4, 5]);
}

/// WHAT: Chunks pushed while capture is paused are dropped
/// WHY: Paused intervals must not contribute media
#[test]
fn given_paused_device_when_chunks_pushed_then_dropped() {
    let mut device = ChunkBufferDevice::new();
    let writer = device.writer();
    device.acquire().unwrap();

    writer.push(&[1, 2]);
    device.pause().unwrap();
    writer.push(&[9, 9, 9]);
    device.resume().unwrap();
    writer.push(&[3]);

    let media = device.finish().unwrap();

    assert_eq!(media.as_bytes(), &[1, 2, 3]);
}

/// WHAT: A straggling push after finish writes nothing
/// WHY: Finish drains the buffer; late callback data must not leak into the
/// next session
#[test]
fn given_finished_device_when_chunk_pushed_then_dropped() {
    let mut device = ChunkBufferDevice::new();
    let writer = device.writer();
    device.acquire().unwrap();
    writer.push(&[1]);
    device.finish().unwrap();

    writer.push(&[2, 2]);

    device.acquire().unwrap();
    let media = device.finish().unwrap();
    assert!(media.is_empty());
}

/// WHAT: Release discards buffered chunks and frees the device
/// WHY: Reset must leave no media behind and allow a fresh acquire
#[test]
fn given_buffered_chunks_when_released_then_device_empty_and_reusable() {
    let mut device = ChunkBufferDevice::new();
    let writer = device.writer();
    device.acquire().unwrap();
    writer.push(&[7, 7, 7]);

    device.release();

    device.acquire().unwrap();
    let media = device.finish().unwrap();
    assert!(media.is_empty());
}
