//! `rolling_log` provides leveled, timestamped, call-site annotated logging with an optional
//! rotating file sink.
//!
//! It offers:
//! - A [`Logger`] gating records by [`Level`] and serializing them onto a single writer, one
//!   complete line per record.
//! - Level-specific macros ([`notice!`], [`warningf!`], ...) that attribute records to their
//!   invocation site.
//! - A [`FileSink`] that routes a logger's output to `<dir>/<prefix>.log`, archives that file
//!   whenever a [`RotationPolicy`] asks for it, and deletes archives older than a retention window,
//!   all from a background thread started by [`set_up_file_logger`].
//!
//! Every record is rendered as one line of five `": "`-separated fields:
//!
//! ```text
//! NOTICE: 08-06 10:45:19.598: g=12: server.rs:100: hello world
//! ```
//!
//! holding the level, the local date and time, the id of the emitting thread, the call site and
//! the message.
//!
//! The crate reports problems of its own background work (failed renames, unreadable
//! directories, ...) as [`tracing`] events, never through the logger it manages.
//!
//! # Example
//!
//! ```
//! use rolling_log::{notice, warningf, Level, Logger};
//!
//! let logger = Logger::stderr(Level::Notice);
//! notice!(logger, "hi, the answer is:", 42).expect("write to stderr");
//! warningf!(logger, "{} retries left", 2).expect("write to stderr");
//! logger.debug("not written, DEBUG is below NOTICE").expect("write to stderr");
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc(test(attr(deny(warnings))))]

mod config;
mod error;
mod file_sink;
mod formatter;
mod level;
mod logger;
mod macros;
mod policy;
mod retention;
mod unit_id;

pub use time::{OffsetDateTime, UtcOffset};

#[doc(hidden)]
pub use self::macros::{as_display, SpaceJoined};
pub use self::{
    config::{
        FileLoggerConfig, DEFAULT_CHECK_INTERVAL, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE,
        DEFAULT_RETENTION, MIN_CHECK_INTERVAL,
    },
    error::{LogError, SetupError},
    file_sink::{set_up_file_logger, FileSink, FileSinkHandle, TickOutcome},
    formatter::{format_record, short_file_name, Record, UNKNOWN_FILE},
    level::Level,
    logger::{default_logger, Logger},
    policy::{DailyPolicy, RotationPolicy, SizeLimitPolicy},
    retention::{sweep, SweepOutcome},
    unit_id::current_unit_id,
};
