//! RingLog - Bounded Lock-Free MPSC Log Record Transport
//!
//! A ring transport for log records in environments where allocation is
//! forbidden and producers may run in asynchronous contexts (threads,
//! interrupt handlers, signal handlers). Many producers deposit records
//! into one shared power-of-two byte ring; exactly one consumer drains
//! them.
//!
//! # Key Features
//!
//! - Wait-free-on-the-uncontended-path reservation: one CAS on the write
//!   cursor claims a record span
//! - Length-last commit: the record's length word doubles as its size, its
//!   completion flag, and the release/acquire edge that publishes the bytes
//! - Non-blocking everywhere: `Full`, `Empty`, and `Busy` return
//!   immediately; producers and the consumer never wait on each other
//! - Level gate in front of reservation: filtered records are successful
//!   no-ops
//! - Zero per-record overhead beyond the 12-byte header and word padding
//!
//! # Example
//!
//! ```
//! use ringlog_rs::{Level, LogBuffer, Logger};
//!
//! let mut storage = LogBuffer::<1024>::new();
//! let log = Logger::new(storage.as_mut_slice()).unwrap();
//!
//! // Producers may write from any thread or signal context.
//! log.write(Level::Info, 12345, "service started").unwrap();
//! ringlog_rs::record!(log, Level::Warn, 12346, "queue depth {}", 17).unwrap();
//!
//! // Exactly one consumer drains committed records.
//! let mut consumer = log.consumer().unwrap();
//! let mut out = [0u8; 128];
//! let drained = consumer.read(&mut out).unwrap();
//! assert_eq!(drained.level, Level::Info);
//! assert_eq!(&out[..drained.len], b"service started");
//! ```

mod backoff;
mod error;
mod fmtbuf;
mod invariants;
mod level;
mod logger;
mod record;
mod ring;

pub use backoff::Backoff;
pub use error::{DrainError, InitError, WriteError};
pub use fmtbuf::{FmtBuf, FMT_SCRATCH_LEN};
pub use level::Level;
pub use logger::{Consumer, Drained, LogBuffer, Logger};

/// Formats and writes one record through [`Logger::write_fmt`].
///
/// ```
/// # use ringlog_rs::{Level, LogBuffer, Logger};
/// # let mut storage = LogBuffer::<256>::new();
/// # let log = Logger::new(storage.as_mut_slice()).unwrap();
/// ringlog_rs::record!(log, Level::Info, 1, "worker {} up", 3).unwrap();
/// ```
#[macro_export]
macro_rules! record {
    ($logger:expr, $level:expr, $timestamp:expr, $($arg:tt)*) => {
        $logger.write_fmt($level, $timestamp, ::core::format_args!($($arg)*))
    };
}
