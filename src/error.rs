//! Error types for ring transport operations.

use thiserror::Error;

/// Errors from [`Logger::new`](crate::Logger::new) validation of the backing
/// buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InitError {
    /// Buffer length must be a nonzero power of two so cursor arithmetic can
    /// be mask-based.
    #[error("buffer length {len} is not a nonzero power of two")]
    NotPowerOfTwo {
        /// The rejected buffer length.
        len: usize,
    },

    /// The length word of each record is accessed as an `AtomicU32` in
    /// place, which requires the buffer base to be 4-byte aligned.
    #[error("buffer is not 4-byte aligned")]
    Misaligned,

    /// Cursors are 32-bit; buffers past 2^31 bytes are out of range.
    #[error("buffer length {len} exceeds the 2^31-byte cursor range")]
    TooLarge {
        /// The rejected buffer length.
        len: usize,
    },
}

/// Errors from the producer-side write operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WriteError {
    /// Not enough free space for the record. Transient back-pressure: the
    /// caller decides whether to drop, retry, or escalate.
    #[error("ring is full")]
    Full,

    /// The record (header plus payload) exceeds half the ring capacity and
    /// can never be admitted at this capacity.
    #[error("record of {size} bytes exceeds the per-record maximum of {max}")]
    Oversize {
        /// Total record size that was requested.
        size: usize,
        /// Largest admissible total record size for this ring.
        max: usize,
    },
}

impl WriteError {
    /// Returns `true` if retrying later may succeed.
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Full)
    }
}

/// Errors from the consumer-side drain operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DrainError {
    /// No records are pending.
    #[error("ring is empty")]
    Empty,

    /// The record at the read cursor is reserved but not yet committed by
    /// its producer. The consumer must retry rather than skip: skipping
    /// would lose ordering and could read a partially written record.
    #[error("record at the read cursor is reserved but not yet committed")]
    Busy,

    /// The length word at the read cursor is outside the valid record
    /// range. Cannot occur with correctly operating producers; surfaced
    /// instead of advancing into garbage.
    #[error("on-ring record length is corrupt ({length})")]
    CorruptLength {
        /// The length word observed at the read cursor.
        length: u32,
    },

    /// The level word of a committed record is not a defined ordinal.
    /// Cannot occur with correctly operating producers, which write levels
    /// through the typed API.
    #[error("on-ring record level is corrupt ({level})")]
    CorruptLevel {
        /// The level word observed in the record header.
        level: u32,
    },
}

impl DrainError {
    /// Returns `true` if retrying later may succeed (`Empty` or `Busy`).
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Empty | Self::Busy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(WriteError::Full.is_transient());
        assert!(!WriteError::Oversize { size: 600, max: 512 }.is_transient());
        assert!(DrainError::Empty.is_transient());
        assert!(DrainError::Busy.is_transient());
        assert!(!DrainError::CorruptLength { length: 9999 }.is_transient());
        assert!(!DrainError::CorruptLevel { level: 42 }.is_transient());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(WriteError::Full.to_string(), "ring is full");
        assert_eq!(
            DrainError::CorruptLength { length: 7 }.to_string(),
            "on-ring record length is corrupt (7)"
        );
        assert_eq!(
            DrainError::CorruptLevel { level: 42 }.to_string(),
            "on-ring record level is corrupt (42)"
        );
    }
}
