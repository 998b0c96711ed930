//! Renders a single log record into the plain-text line format:
//!
//! ```text
//! LEVEL: MM-DD HH:MM:SS.mmm: g=UNIT_ID: FILE:LINE: MESSAGE
//! ```
//!
//! For example: `NOTICE: 08-06 10:45:19.598: g=12: server.rs:100: hello world`.

use std::{fmt, io::Write, panic::Location};

use time::OffsetDateTime;

use crate::Level;

/// File name rendered when the call site could not be resolved.
pub const UNKNOWN_FILE: &str = "???";

/// A single log record, borrowed for the duration of one emit call.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    /// Severity of the record.
    pub level: Level,

    /// Wall-clock time at which the record was emitted.
    pub time: OffsetDateTime,

    /// Id of the thread that emitted the record, see [`current_unit_id`][crate::current_unit_id].
    pub unit_id: u64,

    /// Source file of the call site, as reported by the compiler.
    pub file: &'a str,

    /// Source line of the call site.
    pub line: u32,

    /// The message.
    pub message: fmt::Arguments<'a>,
}

impl<'a> Record<'a> {
    /// Creates a record for the given call site, or for `???:0` if the call site is unknown.
    pub fn new(
        level: Level,
        time: OffsetDateTime,
        unit_id: u64,
        location: Option<&'a Location<'a>>,
        message: fmt::Arguments<'a>,
    ) -> Self {
        let (file, line) = location.map_or((UNKNOWN_FILE, 0), |loc| (loc.file(), loc.line()));
        Self {
            level,
            time,
            unit_id,
            file,
            line,
            message,
        }
    }
}

/// Returns the path component after the final separator, or the whole path if there is none.
pub fn short_file_name(file: &str) -> &str {
    file.rsplit_once(['/', '\\']).map_or(file, |(_, short)| short)
}

/// Appends the formatted record to `buffer`, terminated by exactly one newline.
///
/// Nothing is written anywhere else: the caller hands the whole buffer to its writer in a single
/// `write_all` call, so concurrent writers cannot fragment the line.
///
/// # Errors
///
/// Returns [`fmt::Error`] if a value in the message fails to render. The buffer then holds a
/// partial line and must not be written out.
pub fn format_record(buffer: &mut Vec<u8>, record: &Record<'_>) -> fmt::Result {
    let time = record.time;
    // Writing into a `Vec` fails only when a `Display` implementation does.
    write!(
        buffer,
        "{level}: {month:02}-{day:02} {hour:02}:{minute:02}:{second:02}.{millis:03}: g={unit}: \
         {file}:{line}: ",
        level = record.level,
        month = u8::from(time.month()),
        day = time.day(),
        hour = time.hour(),
        minute = time.minute(),
        second = time.second(),
        millis = time.millisecond(),
        unit = record.unit_id,
        file = short_file_name(record.file),
        line = record.line,
    )
    .map_err(|_| fmt::Error)?;
    buffer.write_fmt(record.message).map_err(|_| fmt::Error)?;

    if buffer.last() != Some(&b'\n') {
        buffer.push(b'\n');
    }
    Ok(())
}
