//! On-ring record layout.
//!
//! A committed record occupies a contiguous span of the ring (modulo
//! capacity), in host-native byte order:
//!
//! ```text
//! offset 0..4   : length (u32): total record size, doubles as commit flag
//! offset 4..8   : level (u32)
//! offset 8..12  : timestamp (u32)
//! offset 12..N  : payload
//! offset N..P   : zero padding, P = (N + 3) & !3
//! ```
//!
//! The length word stores `12 + payload_len` (unpadded); the cursor advance
//! for a record is that value rounded up to the 4-byte grain. A zero length
//! word marks a slot as free or reserved-but-uncommitted.

/// Header size in bytes: length + level + timestamp words.
pub(crate) const HEADER_LEN: u32 = 12;

/// Byte offset of the level word within a record.
pub(crate) const LEVEL_OFFSET: u32 = 4;

/// Byte offset of the timestamp word within a record.
pub(crate) const TIMESTAMP_OFFSET: u32 = 8;

/// Rounds `n` up to the 4-byte alignment grain of the ring.
#[inline]
pub(crate) const fn align_up(n: u32) -> u32 {
    (n + 3) & !3
}

/// Largest total record size (header + payload) admitted for a ring of the
/// given capacity. Capping records at half the ring keeps the worst-case
/// consumer pause proportional to half the buffer and prevents one record
/// plus a stalled producer from wrapping the consumer's view.
#[inline]
pub(crate) const fn max_record(capacity: u32) -> u32 {
    capacity / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up_to_word_grain() {
        assert_eq!(align_up(0), 0);
        assert_eq!(align_up(1), 4);
        assert_eq!(align_up(4), 4);
        assert_eq!(align_up(12), 12);
        assert_eq!(align_up(13), 16);
        assert_eq!(align_up(15), 16);
    }

    #[test]
    fn test_aligned_advance_never_exceeds_half_capacity() {
        // max_record is itself 4-aligned for any capacity >= 8, so rounding
        // an admitted total up never pushes the advance past the cap.
        for bits in 3..20 {
            let capacity = 1u32 << bits;
            let max = max_record(capacity);
            assert_eq!(max % 4, 0);
            assert!(align_up(max) <= max);
        }
    }
}
