//! Debug assertion macros for ring transport invariants.
//!
//! Only active in debug builds (`debug_assert!`), so there is zero overhead
//! in release builds.

/// Assert that a byte index into the backing buffer sits on the 4-byte word
/// grain before it is reinterpreted as an `AtomicU32`.
macro_rules! debug_assert_word_aligned {
    ($idx:expr) => {
        debug_assert!(
            $idx % 4 == 0,
            "word access at unaligned buffer index {}",
            $idx
        )
    };
}

/// Assert that the logical fill stays within `[0, capacity - 1]`. One
/// byte-slot is sacrificed so `write == read` unambiguously means empty.
macro_rules! debug_assert_fill_bounded {
    ($used:expr, $capacity:expr) => {
        debug_assert!(
            $used < $capacity,
            "fill {} reached capacity {}; the empty slot was consumed",
            $used,
            $capacity
        )
    };
}

/// Assert that a cursor value stays masked into the buffer range.
macro_rules! debug_assert_cursor_masked {
    ($name:literal, $pos:expr, $capacity:expr) => {
        debug_assert!(
            $pos < $capacity,
            "{} cursor {} escaped the masked range [0, {})",
            $name,
            $pos,
            $capacity
        )
    };
}

/// Assert that a record length admitted for writing is within the layout
/// bounds: at least a header, at most half the capacity.
macro_rules! debug_assert_record_len {
    ($total:expr, $max:expr) => {
        debug_assert!(
            $total >= crate::record::HEADER_LEN && $total <= $max,
            "record length {} outside admissible range [{}, {}]",
            $total,
            crate::record::HEADER_LEN,
            $max
        )
    };
}

pub(crate) use debug_assert_cursor_masked;
pub(crate) use debug_assert_fill_bounded;
pub(crate) use debug_assert_record_len;
pub(crate) use debug_assert_word_aligned;
