//! Log severities.

use std::{fmt, str::FromStr};

use crate::LogError;

/// Severity of a log record.
///
/// Levels are ordered by ordinal: [`Level::Fatal`] is the most severe and [`Level::Debug`] the
/// least. [`Level::None`] sits above `Fatal` and, used as a threshold, disables all output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "UPPERCASE")
)]
pub enum Level {
    /// Log nothing.
    None,

    /// Unrecoverable conditions. This is only a severity name; nothing terminates the process.
    Fatal,

    /// Unexpected conditions the program can continue from.
    Warning,

    /// Normal but significant events.
    Notice,

    /// Fine-grained progress information.
    Trace,

    /// Developer diagnostics.
    Debug,
}

impl Level {
    /// All levels, in ordinal order.
    pub const ALL: [Self; 6] = [
        Self::None,
        Self::Fatal,
        Self::Warning,
        Self::Notice,
        Self::Trace,
        Self::Debug,
    ];

    /// The upper-case name rendered as the first field of a log line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Fatal => "FATAL",
            Self::Warning => "WARNING",
            Self::Notice => "NOTICE",
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
        }
    }

    pub(crate) const fn ordinal(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Fatal => 1,
            Self::Warning => 2,
            Self::Notice => 3,
            Self::Trace => 4,
            Self::Debug => 5,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.ordinal()
    }
}

impl TryFrom<u8> for Level {
    type Error = LogError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.ordinal() == value)
            .ok_or(LogError::InvalidLevel(value))
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LogError::UnknownLevelName(s.to_string()))
    }
}
