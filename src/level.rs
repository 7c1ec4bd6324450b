/// Record severity, ordered by increasing importance.
///
/// The ordinal values are part of the on-ring record layout: the level is
/// stored as a host-native `u32` word in each record header. [`Level::None`]
/// is a filter-only sentinel: setting it as the minimum level admits
/// nothing, and records are never written at it.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
    /// Filter sentinel: admits nothing when set as the minimum level.
    None = 6,
}

impl Level {
    /// Returns the constant name of this level.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
            Self::None => "NONE",
        }
    }

    /// Returns the name for a raw ordinal, or `"UNKNOWN"` for values outside
    /// the defined range.
    pub const fn name_of(raw: u32) -> &'static str {
        match Self::from_raw(raw) {
            Some(level) => level.name(),
            None => "UNKNOWN",
        }
    }

    /// Converts a raw ordinal back into a `Level`.
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Trace),
            1 => Some(Self::Debug),
            2 => Some(Self::Info),
            3 => Some(Self::Warn),
            4 => Some(Self::Error),
            5 => Some(Self::Fatal),
            6 => Some(Self::None),
            _ => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_increase_with_severity() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
        assert!(Level::Fatal < Level::None);
    }

    #[test]
    fn test_round_trip_through_raw() {
        for raw in 0..=6 {
            let level = Level::from_raw(raw).unwrap();
            assert_eq!(level as u32, raw);
        }
        assert_eq!(Level::from_raw(7), None);
        assert_eq!(Level::from_raw(u32::MAX), None);
    }

    #[test]
    fn test_names() {
        assert_eq!(Level::Trace.name(), "TRACE");
        assert_eq!(Level::Fatal.name(), "FATAL");
        assert_eq!(Level::name_of(6), "NONE");
        assert_eq!(Level::name_of(42), "UNKNOWN");
        assert_eq!(Level::Warn.to_string(), "WARN");
    }
}
