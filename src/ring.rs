use crate::error::{DrainError, InitError, WriteError};
use crate::invariants::{
    debug_assert_cursor_masked, debug_assert_fill_bounded, debug_assert_record_len,
    debug_assert_word_aligned,
};
use crate::level::Level;
use crate::record::{align_up, max_record, HEADER_LEN, LEVEL_OFFSET, TIMESTAMP_OFFSET};
use crossbeam_utils::CachePadded;
use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::{AtomicU32, Ordering};

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// This is a single shared byte ring with many producers and one consumer.
// Producers race on the write cursor; each byte of the buffer is mutated by
// at most one agent at a time, enforced purely by the protocol below.
//
// ## Cursors
//
// `write` and `read` are 32-bit cursors stored modulo capacity. Capacity is
// a power of two, so all wrap arithmetic is mask-based. The logical fill is
// `(write - read) & mask`, in `[0, capacity - 1]`: one byte-slot is
// sacrificed so `write == read` unambiguously means empty.
//
// ## Producer (reservation + commit)
//
// 1. Load `write` with Acquire, load `read` with Acquire.
// 2. If the aligned record size exceeds `capacity - fill - 1`, fail Full.
// 3. CAS `write -> (write + advance) & mask`, Release on success / Acquire
//    on failure (reload and retry; the weak form is fine, spurious failures
//    just loop). A successful CAS grants exclusive ownership of the span.
// 4. Write the level word, timestamp word, payload bytes, and zero padding
//    into the owned span. No ordering among these; nobody else may touch
//    the span.
// 5. Store the length word with Release. This is the commit: the length
//    doubles as the record size, as the completion flag (zero = not yet
//    committed), and as the synchronization edge that carries every other
//    byte of the record to the consumer.
//
// ## Consumer (drain)
//
// 1. Load `read` and `write` with Acquire; equal means empty.
// 2. Load the length word at `read` with Acquire. Zero means a producer
//    holds the slot but has not committed: report Busy and do NOT advance.
//    Skipping would lose ordering and read partially written bytes.
// 3. Validate the length, copy the header words and payload out, and
//    re-zero every byte of the span.
// 4. Store `read + advance` with Release. The release orders the zeroing
//    before the store, so a producer whose reservation acquires this cursor
//    value observes a fully zeroed span.
//
// ## Word access
//
// The length/level/timestamp words are read and written through `AtomicU32`
// references cast from the buffer. Cursors advance in 4-byte steps over a
// 4-byte-aligned base (validated at init), and a 4-aligned word inside a
// power-of-two buffer never straddles the wrap boundary, so every word slot
// is a naturally aligned u32. Payload bytes use plain memcpy, ordered by
// the length-word and read-cursor edges above.
//
// =============================================================================

/// Largest admissible backing buffer: cursors are u32 and fill arithmetic
/// is mask-based, so capacity must stay within 2^31.
const MAX_CAPACITY: usize = 1 << 31;

/// The core transport: a borrowed byte region addressed modulo capacity by
/// two atomic cursors.
///
/// `Ring` does not own its storage; it borrows the caller's buffer for
/// `'buf` and leaves it zeroed-or-in-protocol at all times. All producer
/// operations are safe to call concurrently from any context. The drain
/// side is `unsafe` with a single-consumer contract, upheld by the public
/// [`Consumer`](crate::Consumer) handle.
pub(crate) struct Ring<'buf> {
    /// Base of the caller's buffer. 4-byte aligned, `capacity` bytes.
    buf: *mut u8,
    capacity: u32,
    mask: u32,
    /// Next free byte offset; advanced by producers via CAS.
    write: CachePadded<AtomicU32>,
    /// Oldest pending byte offset; advanced only by the consumer.
    read: CachePadded<AtomicU32>,
    _storage: PhantomData<&'buf mut [u8]>,
}

// SAFETY: the buffer is shared, but every byte is mutated by at most one
// agent at a time: a producer owns its span from a successful reservation
// CAS until the length-word release store, and the consumer owns a span
// from observing a nonzero length until the read-cursor release store. The
// cursors and header words are atomics. So `Ring` may be shared and sent
// across threads whenever the borrowed bytes may.
unsafe impl Send for Ring<'_> {}
unsafe impl Sync for Ring<'_> {}

impl<'buf> Ring<'buf> {
    /// Validates the backing buffer, zero-fills it, and wraps it in a ring
    /// with both cursors at zero.
    pub(crate) fn new(buf: &'buf mut [u8]) -> Result<Self, InitError> {
        let len = buf.len();
        if len == 0 || !len.is_power_of_two() {
            return Err(InitError::NotPowerOfTwo { len });
        }
        if len > MAX_CAPACITY {
            return Err(InitError::TooLarge { len });
        }
        if buf.as_ptr().align_offset(4) != 0 {
            return Err(InitError::Misaligned);
        }

        // Free slots must read zero: the length word doubles as the
        // completion flag.
        buf.fill(0);

        Ok(Self {
            buf: buf.as_mut_ptr(),
            capacity: len as u32,
            mask: len as u32 - 1,
            write: CachePadded::new(AtomicU32::new(0)),
            read: CachePadded::new(AtomicU32::new(0)),
            _storage: PhantomData,
        })
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Returns the ring capacity in bytes.
    #[inline]
    pub(crate) fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Returns the number of bytes occupied by pending records, headers and
    /// padding included. A possibly stale snapshot.
    #[inline]
    pub(crate) fn len(&self) -> u32 {
        let write = self.write.load(Ordering::Acquire);
        let read = self.read.load(Ordering::Acquire);
        write.wrapping_sub(read) & self.mask
    }

    /// Returns `true` if no records are pending. A possibly stale snapshot.
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.write.load(Ordering::Acquire) == self.read.load(Ordering::Acquire)
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Writes one record: validate, reserve, fill, commit.
    ///
    /// Safe to call concurrently from any number of producers, including
    /// from contexts that may preempt each other at any instruction.
    pub(crate) fn push_record(
        &self,
        level: Level,
        timestamp: u32,
        payload: &[u8],
    ) -> Result<(), WriteError> {
        let (start, total) = self.reserve_record(payload.len())?;
        self.fill_record(start, total, level, timestamp, payload);
        self.commit(start, total);
        Ok(())
    }

    /// Validates the record size and claims a span for it.
    ///
    /// On success the caller exclusively owns `[start, start + advance)`
    /// modulo capacity until it commits; the consumer sees a zero length
    /// word there and reports the slot as busy in the meantime.
    pub(crate) fn reserve_record(&self, payload_len: usize) -> Result<(u32, u32), WriteError> {
        let max = max_record(self.capacity);
        let total = u64::from(HEADER_LEN) + payload_len as u64;
        if total > u64::from(max) {
            return Err(WriteError::Oversize {
                size: HEADER_LEN as usize + payload_len,
                max: max as usize,
            });
        }
        let total = total as u32;

        let start = self.reserve(align_up(total))?;
        Ok((start, total))
    }

    /// CAS loop advancing the write cursor by `advance` bytes.
    fn reserve(&self, advance: u32) -> Result<u32, WriteError> {
        let mut write = self.write.load(Ordering::Acquire);
        loop {
            // Pairs with the consumer's release store of the read cursor: a
            // reservation that sees an advanced read cursor also sees the
            // zeroed bytes behind it.
            let read = self.read.load(Ordering::Acquire);
            let used = write.wrapping_sub(read) & self.mask;
            debug_assert_fill_bounded!(used, self.capacity);

            let available = self.capacity - used - 1;
            if advance > available {
                return Err(WriteError::Full);
            }

            let new_write = write.wrapping_add(advance) & self.mask;
            match self.write.compare_exchange_weak(
                write,
                new_write,
                Ordering::Release,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    debug_assert_cursor_masked!("write", new_write, self.capacity);
                    return Ok(write);
                }
                Err(current) => write = current,
            }
        }
    }

    /// Writes the header tail, payload, and zero padding into an owned span.
    ///
    /// Ordering among these writes is irrelevant; the span is invisible to
    /// the consumer until [`commit`](Self::commit) publishes the length.
    pub(crate) fn fill_record(
        &self,
        start: u32,
        total: u32,
        level: Level,
        timestamp: u32,
        payload: &[u8],
    ) {
        debug_assert_record_len!(total, max_record(self.capacity));

        self.word(start.wrapping_add(LEVEL_OFFSET))
            .store(level as u32, Ordering::Relaxed);
        self.word(start.wrapping_add(TIMESTAMP_OFFSET))
            .store(timestamp, Ordering::Relaxed);
        self.copy_in(start.wrapping_add(HEADER_LEN), payload);

        // Unused bytes of the ring must stay zero.
        let advance = align_up(total);
        self.zero_span(start.wrapping_add(total), (advance - total) as usize);
    }

    /// Publishes a filled span: the length-last release store that makes
    /// the record visible to the consumer and carries its bytes along.
    pub(crate) fn commit(&self, start: u32, total: u32) {
        self.word(start).store(total, Ordering::Release);
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Drains one record into `out`, returning its level, timestamp, and
    /// the number of payload bytes copied (payloads longer than `out` are
    /// silently truncated; the cursor still advances past the full record).
    ///
    /// # Safety
    ///
    /// At most one agent may drain at a time. The caller must guarantee
    /// exclusive consumer access for the duration of the call; concurrent
    /// drains would race on the span being copied out and re-zeroed.
    pub(crate) unsafe fn drain(&self, out: &mut [u8]) -> Result<(Level, u32, usize), DrainError> {
        let read = self.read.load(Ordering::Acquire);
        let write = self.write.load(Ordering::Acquire);
        if read == write {
            return Err(DrainError::Empty);
        }

        // Zero means the producer that owns this slot has not committed.
        // Refuse to advance; later slots may already be committed but stay
        // unreachable until this one resolves.
        let len_word = self.word(read);
        let length = len_word.load(Ordering::Acquire);
        if length == 0 {
            return Err(DrainError::Busy);
        }
        if length < HEADER_LEN || length > max_record(self.capacity) {
            return Err(DrainError::CorruptLength { length });
        }

        let raw_level = self
            .word(read.wrapping_add(LEVEL_OFFSET))
            .load(Ordering::Relaxed);
        let Some(level) = Level::from_raw(raw_level) else {
            return Err(DrainError::CorruptLevel { level: raw_level });
        };
        let timestamp = self
            .word(read.wrapping_add(TIMESTAMP_OFFSET))
            .load(Ordering::Relaxed);

        // Erase the completion flag, then recycle the rest of the span.
        len_word.store(0, Ordering::Relaxed);
        self.word(read.wrapping_add(LEVEL_OFFSET))
            .store(0, Ordering::Relaxed);
        self.word(read.wrapping_add(TIMESTAMP_OFFSET))
            .store(0, Ordering::Relaxed);

        let payload_len = (length - HEADER_LEN) as usize;
        let copied = payload_len.min(out.len());
        self.copy_out(read.wrapping_add(HEADER_LEN), &mut out[..copied]);

        // Zero the payload and padding BEFORE releasing the read cursor:
        // the release store then orders the zeroing before any producer
        // reuse of these bytes.
        let advance = align_up(length);
        self.zero_span(read.wrapping_add(HEADER_LEN), (advance - HEADER_LEN) as usize);

        let new_read = read.wrapping_add(advance) & self.mask;
        debug_assert_cursor_masked!("read", new_read, self.capacity);
        self.read.store(new_read, Ordering::Release);

        Ok((level, timestamp, copied))
    }

    // ---------------------------------------------------------------------
    // WRAP HELPERS
    // ---------------------------------------------------------------------

    /// Byte index of a cursor position within the buffer.
    #[inline]
    fn index(&self, pos: u32) -> usize {
        (pos & self.mask) as usize
    }

    /// Atomic view of the 32-bit word at `pos` (modulo capacity).
    #[inline]
    fn word(&self, pos: u32) -> &AtomicU32 {
        let idx = self.index(pos);
        debug_assert_word_aligned!(idx);
        // SAFETY: idx is in bounds (masked) and 4-aligned: cursors advance
        // in 4-byte steps over a 4-aligned base, and a 4-aligned word in a
        // power-of-two buffer cannot straddle the wrap boundary. AtomicU32
        // is layout-compatible with u32, and atomic access makes the mixed
        // producer/consumer traffic on these words well defined.
        unsafe { &*self.buf.add(idx).cast::<AtomicU32>() }
    }

    /// Copies `src` into the ring at `pos`, splitting at the wrap boundary.
    fn copy_in(&self, pos: u32, src: &[u8]) {
        let idx = self.index(pos);
        let first = src.len().min(self.capacity as usize - idx);
        // SAFETY: the caller owns `[pos, pos + src.len())` by reservation,
        // and both segments are in bounds: `idx + first <= capacity` and
        // the remainder starts at offset 0.
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), self.buf.add(idx), first);
            ptr::copy_nonoverlapping(src.as_ptr().add(first), self.buf, src.len() - first);
        }
    }

    /// Copies ring bytes at `pos` into `dst`, splitting at the wrap boundary.
    fn copy_out(&self, pos: u32, dst: &mut [u8]) {
        let idx = self.index(pos);
        let first = dst.len().min(self.capacity as usize - idx);
        // SAFETY: the consumer owns `[pos, pos + dst.len())` between the
        // length acquire and the read-cursor release; segments in bounds as
        // in `copy_in`.
        unsafe {
            ptr::copy_nonoverlapping(self.buf.add(idx), dst.as_mut_ptr(), first);
            ptr::copy_nonoverlapping(self.buf, dst.as_mut_ptr().add(first), dst.len() - first);
        }
    }

    /// Zeroes `len` ring bytes at `pos`, splitting at the wrap boundary.
    fn zero_span(&self, pos: u32, len: usize) {
        let idx = self.index(pos);
        let first = len.min(self.capacity as usize - idx);
        // SAFETY: only called on a span owned by the current agent; bounds
        // as in `copy_in`.
        unsafe {
            ptr::write_bytes(self.buf.add(idx), 0, first);
            ptr::write_bytes(self.buf, 0, len - first);
        }
    }
}
