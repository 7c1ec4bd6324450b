use crate::backoff::Backoff;
use crate::error::{DrainError, InitError, WriteError};
use crate::fmtbuf::{FmtBuf, FMT_SCRATCH_LEN};
use crate::level::Level;
use crate::record::{max_record, HEADER_LEN};
use crate::ring::Ring;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// A bounded, lock-free log record transport over a caller-provided buffer.
///
/// Any number of producers may [`write`](Self::write) concurrently from any
/// context: threads, interrupt handlers, signal handlers. Exactly one
/// [`Consumer`] at a time drains committed records; claim it with
/// [`consumer`](Self::consumer).
///
/// The logger borrows the backing bytes and never allocates. Records below
/// the minimum level are silently dropped as successful no-ops, so a
/// filtered write is indistinguishable from a recorded one by return value.
pub struct Logger<'buf> {
    ring: Ring<'buf>,
    /// Minimum admitted level, stored as its ordinal.
    min_level: AtomicU8,
    /// Claim flag for the single [`Consumer`] handle.
    consumer_claimed: AtomicBool,
}

impl<'buf> Logger<'buf> {
    /// Creates a logger over `buf`, zero-filling it.
    ///
    /// The buffer length must be a nonzero power of two no larger than
    /// 2^31, and the buffer must be 4-byte aligned ([`LogBuffer`] provides
    /// aligned storage). The minimum level starts at [`Level::Trace`].
    pub fn new(buf: &'buf mut [u8]) -> Result<Self, InitError> {
        Ok(Self {
            ring: Ring::new(buf)?,
            min_level: AtomicU8::new(Level::Trace as u8),
            consumer_claimed: AtomicBool::new(false),
        })
    }

    // ---------------------------------------------------------------------
    // LEVEL CONTROL
    // ---------------------------------------------------------------------

    /// Sets the minimum admitted level. Safe from any context; concurrent
    /// producers observe the change with bounded delay.
    #[inline]
    pub fn set_level(&self, level: Level) {
        self.min_level.store(level as u8, Ordering::Relaxed);
    }

    /// Returns the current minimum level.
    #[inline]
    pub fn level(&self) -> Level {
        // Only ever stores Level ordinals, so the fallback is unreachable.
        Level::from_raw(u32::from(self.min_level.load(Ordering::Relaxed)))
            .unwrap_or(Level::Trace)
    }

    #[inline]
    fn admits(&self, level: Level) -> bool {
        // `None` is a filter sentinel, never a record level; with the
        // minimum at `None`, nothing is admitted.
        level != Level::None && level as u8 >= self.min_level.load(Ordering::Relaxed)
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Writes a text message. Async-signal-safe: no locks, no allocation.
    ///
    /// Returns `Ok(())` both for recorded and for level-filtered messages.
    #[inline]
    pub fn write(&self, level: Level, timestamp: u32, msg: &str) -> Result<(), WriteError> {
        self.write_raw(level, timestamp, msg.as_bytes())
    }

    /// Writes a raw byte payload. Async-signal-safe: no locks, no
    /// allocation, no nonreentrant library calls.
    pub fn write_raw(&self, level: Level, timestamp: u32, payload: &[u8]) -> Result<(), WriteError> {
        if !self.admits(level) {
            return Ok(());
        }
        self.ring.push_record(level, timestamp, payload)
    }

    /// Formats a message into a stack scratch buffer and writes it.
    ///
    /// Output past [`FMT_SCRATCH_LEN`] bytes is silently truncated. The
    /// level gate runs first, so filtered records skip the formatting cost.
    ///
    /// Unlike the raw variants this path runs caller `Display`/`Debug`
    /// impls, which makes it unsuitable for signal handlers; use
    /// [`write`](Self::write) or [`write_raw`](Self::write_raw) there.
    pub fn write_fmt(
        &self,
        level: Level,
        timestamp: u32,
        args: fmt::Arguments<'_>,
    ) -> Result<(), WriteError> {
        if !self.admits(level) {
            return Ok(());
        }
        let mut scratch = FmtBuf::<FMT_SCRATCH_LEN>::new();
        // Formatting into a FmtBuf cannot fail; overflow truncates.
        let _ = fmt::Write::write_fmt(&mut scratch, args);
        self.ring.push_record(level, timestamp, scratch.as_bytes())
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Claims the single drain handle.
    ///
    /// Returns `None` while a [`Consumer`] is alive; dropping it releases
    /// the claim so a new handle may be taken (sequential handoff).
    pub fn consumer(&self) -> Option<Consumer<'_, 'buf>> {
        if self.consumer_claimed.swap(true, Ordering::Acquire) {
            return None;
        }
        Some(Consumer { log: self })
    }

    // ---------------------------------------------------------------------
    // OBSERVERS
    // ---------------------------------------------------------------------

    /// Returns the bytes occupied by pending records (headers and padding
    /// included). A possibly stale snapshot; establishes no ordering with
    /// later operations.
    #[inline]
    pub fn len(&self) -> u32 {
        self.ring.len()
    }

    /// Returns `true` if no records are pending. A possibly stale snapshot.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Returns the ring capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.ring.capacity()
    }

    /// Returns the largest payload a single record can carry on this ring.
    /// Records are capped at half the capacity, header included.
    #[inline]
    pub fn max_payload(&self) -> usize {
        max_record(self.ring.capacity()).saturating_sub(HEADER_LEN) as usize
    }
}

impl fmt::Debug for Logger<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("min_level", &self.level())
            .finish_non_exhaustive()
    }
}

/// One drained record: its header fields and the number of payload bytes
/// copied into the caller's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drained {
    /// The record's severity.
    pub level: Level,
    /// The opaque caller-supplied timestamp.
    pub timestamp: u32,
    /// Payload bytes copied. Payloads longer than the output buffer are
    /// silently truncated; the record is still fully consumed.
    pub len: usize,
}

/// The single drain handle for a [`Logger`].
///
/// At most one `Consumer` is alive at a time, which is what makes the
/// drain side of the protocol wait-free without inter-consumer
/// synchronization. Dropping the handle lets another be claimed.
#[derive(Debug)]
pub struct Consumer<'log, 'buf> {
    log: &'log Logger<'buf>,
}

impl Consumer<'_, '_> {
    /// Drains the oldest committed record into `out`.
    ///
    /// Returns [`DrainError::Empty`] on a quiescent ring and
    /// [`DrainError::Busy`] while the record at the read cursor is
    /// reserved but not yet committed; retry later, since the slot cannot be
    /// skipped without losing ordering.
    pub fn read(&mut self, out: &mut [u8]) -> Result<Drained, DrainError> {
        // SAFETY: `&mut self` on the sole live Consumer (enforced by the
        // claim flag) makes this the only drain in flight.
        let (level, timestamp, len) = unsafe { self.log.ring.drain(out) }?;
        Ok(Drained { level, timestamp, len })
    }

    /// Like [`read`](Self::read), but retries transient conditions
    /// (`Empty`, `Busy`) with adaptive backoff before giving up and
    /// returning the last error. Bounded; never blocks indefinitely.
    pub fn read_with_backoff(&mut self, out: &mut [u8]) -> Result<Drained, DrainError> {
        let mut backoff = Backoff::new();
        loop {
            match self.read(out) {
                Err(err) if err.is_transient() && !backoff.is_completed() => backoff.snooze(),
                result => return result,
            }
        }
    }

    /// Access to the logger this handle drains, for observers.
    #[inline]
    pub fn logger(&self) -> &Logger<'_> {
        self.log
    }
}

impl Drop for Consumer<'_, '_> {
    fn drop(&mut self) {
        // Pairs with the Acquire swap in `Logger::consumer`, so the next
        // claimant observes everything this consumer did.
        self.log.consumer_claimed.store(false, Ordering::Release);
    }
}

/// Owned, 4-byte-aligned backing storage for a [`Logger`].
///
/// Lets callers declare static or stack storage that satisfies the
/// alignment precondition without touching the allocator:
///
/// ```
/// use ringlog_rs::{LogBuffer, Logger};
///
/// let mut storage = LogBuffer::<1024>::new();
/// let log = Logger::new(storage.as_mut_slice()).unwrap();
/// assert_eq!(log.capacity(), 1024);
/// ```
#[repr(C, align(4))]
pub struct LogBuffer<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> LogBuffer<N> {
    /// Creates zeroed storage.
    pub const fn new() -> Self {
        Self { bytes: [0; N] }
    }

    /// The backing bytes, for handing to [`Logger::new`].
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl<const N: usize> Default for LogBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
