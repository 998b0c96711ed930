//! Level-specific logging macros.
//!
//! Each level has two macros taking the logger as first argument:
//!
//! - the plain one (`notice!`) renders its remaining arguments with [`Display`][std::fmt::Display]
//!   and joins them with single spaces, and logs an empty message when there are none;
//! - the `f`-suffixed one (`noticef!`) takes a format string, like [`format!`].
//!
//! Both evaluate to `Result<(), LogError>` and attribute the record to the macro invocation site.
//!
//! ```
//! use rolling_log::{notice, noticef, Level, Logger};
//!
//! let logger = Logger::new(Level::Notice, Vec::new());
//! notice!(logger, "the answer is", 42).expect("write to memory");
//! noticef!(logger, "{} requests in {:.1}s", 12, 0.25).expect("write to memory");
//! ```

use std::fmt;

/// Displays a list of values separated by single spaces.
#[doc(hidden)]
#[allow(missing_debug_implementations)] // Holds `dyn Display` trait objects
pub struct SpaceJoined<'a>(pub &'a [&'a dyn fmt::Display]);

impl fmt::Display for SpaceJoined<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut items = self.0.iter();
        if let Some(first) = items.next() {
            first.fmt(f)?;
        }
        for item in items {
            f.write_str(" ")?;
            item.fmt(f)?;
        }
        Ok(())
    }
}

/// Views a value as a `Display` trait object.
#[doc(hidden)]
pub fn as_display<T: fmt::Display>(value: &T) -> &dyn fmt::Display {
    value
}

/// Logs its arguments, separated by spaces, at [`Level::Fatal`][crate::Level::Fatal].
#[macro_export]
macro_rules! fatal {
    ($logger:expr $(,)?) => {
        $logger.fatalf(::std::format_args!(""))
    };
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.fatalf(::std::format_args!(
            "{}",
            $crate::SpaceJoined(&[$($crate::as_display(&$arg)),+])
        ))
    };
}

/// Logs a formatted message at [`Level::Fatal`][crate::Level::Fatal].
#[macro_export]
macro_rules! fatalf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(::std::format_args!($($arg)+))
    };
}

/// Logs its arguments, separated by spaces, at [`Level::Warning`][crate::Level::Warning].
#[macro_export]
macro_rules! warning {
    ($logger:expr $(,)?) => {
        $logger.warningf(::std::format_args!(""))
    };
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.warningf(::std::format_args!(
            "{}",
            $crate::SpaceJoined(&[$($crate::as_display(&$arg)),+])
        ))
    };
}

/// Logs a formatted message at [`Level::Warning`][crate::Level::Warning].
#[macro_export]
macro_rules! warningf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warningf(::std::format_args!($($arg)+))
    };
}

/// Logs its arguments, separated by spaces, at [`Level::Notice`][crate::Level::Notice].
#[macro_export]
macro_rules! notice {
    ($logger:expr $(,)?) => {
        $logger.noticef(::std::format_args!(""))
    };
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.noticef(::std::format_args!(
            "{}",
            $crate::SpaceJoined(&[$($crate::as_display(&$arg)),+])
        ))
    };
}

/// Logs a formatted message at [`Level::Notice`][crate::Level::Notice].
#[macro_export]
macro_rules! noticef {
    ($logger:expr, $($arg:tt)+) => {
        $logger.noticef(::std::format_args!($($arg)+))
    };
}

/// Logs its arguments, separated by spaces, at [`Level::Trace`][crate::Level::Trace].
#[macro_export]
macro_rules! trace {
    ($logger:expr $(,)?) => {
        $logger.tracef(::std::format_args!(""))
    };
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.tracef(::std::format_args!(
            "{}",
            $crate::SpaceJoined(&[$($crate::as_display(&$arg)),+])
        ))
    };
}

/// Logs a formatted message at [`Level::Trace`][crate::Level::Trace].
#[macro_export]
macro_rules! tracef {
    ($logger:expr, $($arg:tt)+) => {
        $logger.tracef(::std::format_args!($($arg)+))
    };
}

/// Logs its arguments, separated by spaces, at [`Level::Debug`][crate::Level::Debug].
#[macro_export]
macro_rules! debug {
    ($logger:expr $(,)?) => {
        $logger.debugf(::std::format_args!(""))
    };
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.debugf(::std::format_args!(
            "{}",
            $crate::SpaceJoined(&[$($crate::as_display(&$arg)),+])
        ))
    };
}

/// Logs a formatted message at [`Level::Debug`][crate::Level::Debug].
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debugf(::std::format_args!($($arg)+))
    };
}
