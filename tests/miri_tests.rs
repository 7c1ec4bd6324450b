//! Miri-compatible tests for detecting undefined behavior.
//!
//! Run with: `cargo +nightly miri test --test miri_tests`
//!
//! These tests exercise the unsafe paths of the transport (the raw-pointer
//! word casts, the wrap-aware copies, and the re-zeroing of drained spans)
//! on small buffers so miri's interpreter finishes quickly.

use ringlog_rs::{DrainError, Level, LogBuffer, Logger, WriteError};

#[test]
fn miri_round_trip_small_ring() {
    let mut storage = LogBuffer::<64>::new();
    let log = Logger::new(storage.as_mut_slice()).unwrap();

    log.write(Level::Info, 3, "hi").unwrap();

    let mut consumer = log.consumer().unwrap();
    let mut out = [0u8; 32];
    let d = consumer.read(&mut out).unwrap();
    assert_eq!((d.level, d.timestamp, &out[..d.len]), (Level::Info, 3, &b"hi"[..]));
    assert!(log.is_empty());
}

#[test]
fn miri_wrap_spanning_payloads() {
    let mut storage = LogBuffer::<64>::new();
    let log = Logger::new(storage.as_mut_slice()).unwrap();
    let mut consumer = log.consumer().unwrap();
    let mut out = [0u8; 32];

    // Odd payload sizes walk the record start across every wrap position.
    for i in 0..40u32 {
        let len = (i % 21) as usize;
        let payload: Vec<u8> = (0..len as u8).collect();
        log.write_raw(Level::Debug, i, &payload).unwrap();
        let d = consumer.read(&mut out).unwrap();
        assert_eq!(d.timestamp, i);
        assert_eq!(&out[..d.len], &payload[..]);
    }
    assert!(log.is_empty());
}

#[test]
fn miri_truncating_drain() {
    let mut storage = LogBuffer::<128>::new();
    let log = Logger::new(storage.as_mut_slice()).unwrap();

    log.write(Level::Warn, 1, "a payload wider than out").unwrap();
    log.write(Level::Warn, 2, "next").unwrap();

    let mut consumer = log.consumer().unwrap();
    let mut tiny = [0u8; 6];
    let d = consumer.read(&mut tiny).unwrap();
    assert_eq!((d.timestamp, d.len), (1, 6));
    assert_eq!(&tiny, b"a payl");

    // Zero-length output buffers copy nothing but still consume the record.
    let d = consumer.read(&mut []).unwrap();
    assert_eq!((d.timestamp, d.len), (2, 0));
    assert!(log.is_empty());
}

#[test]
fn miri_full_and_oversize_paths() {
    let mut storage = LogBuffer::<64>::new();
    let log = Logger::new(storage.as_mut_slice()).unwrap();

    assert_eq!(
        log.write_raw(Level::Info, 0, &[0u8; 21]),
        Err(WriteError::Oversize { size: 33, max: 32 })
    );

    log.write_raw(Level::Info, 0, &[7u8; 12]).unwrap();
    log.write_raw(Level::Info, 1, &[8u8; 12]).unwrap();
    assert_eq!(log.write_raw(Level::Info, 2, &[9u8; 12]), Err(WriteError::Full));
}

#[test]
fn miri_consumer_claim_and_handoff() {
    let mut storage = LogBuffer::<64>::new();
    let log = Logger::new(storage.as_mut_slice()).unwrap();

    let first = log.consumer().unwrap();
    assert!(log.consumer().is_none());
    drop(first);

    let mut second = log.consumer().unwrap();
    let mut out = [0u8; 8];
    assert_eq!(second.read(&mut out), Err(DrainError::Empty));
}

#[test]
fn miri_formatted_write() {
    let mut storage = LogBuffer::<256>::new();
    let log = Logger::new(storage.as_mut_slice()).unwrap();

    ringlog_rs::record!(log, Level::Error, 9, "code {:#06x}", 0xBEEFu32).unwrap();

    let mut consumer = log.consumer().unwrap();
    let mut out = [0u8; 64];
    let d = consumer.read(&mut out).unwrap();
    assert_eq!(&out[..d.len], b"code 0xbeef");
}
