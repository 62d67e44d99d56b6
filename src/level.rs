use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Severity of a log entry, ordered from least to most verbose.
///
/// A logger configured with threshold `T` emits an entry at level `L`
/// iff `L <= T`, so `Debug` lets everything through and `Fatal` only
/// lets `Fatal` and `Panic` through.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    /// Logs, then interrupts control flow.
    Panic = 0,
    /// Logs, then terminates the process.
    Fatal = 1,
    /// Errors that should be looked at.
    Error = 2,
    /// Non-critical problems.
    #[serde(alias = "warning")]
    Warn = 3,
    /// General operational entries.
    #[default]
    Info = 4,
    /// Verbose diagnostics.
    Debug = 5,
}

impl LogLevel {
    /// All levels, least verbose first.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Panic,
        LogLevel::Fatal,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
    ];

    /// Whether an entry at `level` passes a threshold of `self`.
    pub fn permits(self, level: LogLevel) -> bool {
        level <= self
    }

    /// Lowercase name, as written to the output.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Panic => "panic",
            LogLevel::Fatal => "fatal",
            LogLevel::Error => "error",
            LogLevel::Warn => "warning",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    pub(crate) fn from_u8(raw: u8) -> LogLevel {
        match raw {
            0 => LogLevel::Panic,
            1 => LogLevel::Fatal,
            2 => LogLevel::Error,
            3 => LogLevel::Warn,
            4 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "panic" => Ok(LogLevel::Panic),
            "fatal" => Ok(LogLevel::Fatal),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "trace" => Ok(LogLevel::Debug),
            other => Err(Error::Config(format!("unknown log level: {other}"))),
        }
    }
}

impl From<&tracing::Level> for LogLevel {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::ERROR => LogLevel::Error,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::INFO => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_by_verbosity() {
        assert!(LogLevel::Panic < LogLevel::Fatal);
        assert!(LogLevel::Fatal < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
    }

    #[test]
    fn test_permits_matrix() {
        for threshold in LogLevel::ALL {
            for level in LogLevel::ALL {
                assert_eq!(
                    threshold.permits(level),
                    (level as u8) <= (threshold as u8),
                    "threshold={threshold} level={level}"
                );
            }
        }
        assert!(LogLevel::Debug.permits(LogLevel::Debug));
        assert!(LogLevel::Fatal.permits(LogLevel::Panic));
        assert!(!LogLevel::Fatal.permits(LogLevel::Error));
    }

    #[test]
    fn test_from_u8_round_trips_discriminant() {
        for level in LogLevel::ALL {
            assert_eq!(LogLevel::from_u8(level as u8), level);
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_tracing_level_mapping() {
        assert_eq!(LogLevel::from(&tracing::Level::TRACE), LogLevel::Debug);
        assert_eq!(LogLevel::from(&tracing::Level::ERROR), LogLevel::Error);
    }

    #[test]
    fn test_default_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }
}
