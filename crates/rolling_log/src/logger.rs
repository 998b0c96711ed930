//! The logger: a level threshold in front of a mutex-protected writer.

use std::{
    cell::Cell,
    fmt,
    io::{self, Write},
    panic::Location,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc, LazyLock,
    },
};

use parking_lot::{Mutex, MutexGuard};
use time::{OffsetDateTime, UtcOffset};

use crate::{
    formatter::{format_record, Record},
    unit_id::current_unit_id,
    Level, LogError,
};

/// Scratch buffers that grew beyond this size are dropped after use.
const RETAINED_BUFFER_CAPACITY: usize = 64 * 1024;

thread_local! {
    /// Buffer each thread renders its records into before taking the output lock.
    static SCRATCH: Cell<Vec<u8>> = const { Cell::new(Vec::new()) };
}

static DEFAULT_LOGGER: LazyLock<Arc<Logger>> =
    LazyLock::new(|| Arc::new(Logger::stderr(Level::Debug)));

/// Returns a process-wide logger that writes every level to standard error.
///
/// Libraries should accept a [`Logger`] from their caller instead; this instance exists for
/// binaries that want a logger without threading one through.
pub fn default_logger() -> &'static Arc<Logger> {
    &DEFAULT_LOGGER
}

/// Identifies one installation of an output writer, so that a file sink can tell whether the
/// writer it installed is still the one receiving records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OutputGeneration(u64);

struct Output {
    writer: Box<dyn Write + Send>,
    generation: u64,
}

/// Exclusive access to a logger's output, held while a file sink rotates the active file.
///
/// No record can be written while the guard is alive.
pub(crate) struct OutputGuard<'a>(MutexGuard<'a, Output>);

impl OutputGuard<'_> {
    pub(crate) fn is_installed(&self, generation: OutputGeneration) -> bool {
        self.0.generation == generation.0
    }

    /// Replaces the writer without starting a new generation.
    pub(crate) fn replace(&mut self, writer: Box<dyn Write + Send>) {
        let mut previous = std::mem::replace(&mut self.0.writer, writer);
        // The previous writer is about to be dropped, a failed flush has nowhere to go.
        let _ = previous.flush();
    }
}

/// A leveled logger writing one line per record to a single output.
///
/// Records are emitted through the level-specific methods ([`Logger::notice`],
/// [`Logger::warningf`], ...) or the corresponding macros ([`notice!`][crate::notice],
/// [`warningf!`][crate::warningf], ...). A record is written only if its level is enabled, that
/// is if it lies between [`Level::Fatal`] and the configured threshold.
///
/// All writes go through one mutex and are issued as a single `write_all` per record, so records
/// emitted concurrently from several threads never interleave. The message is rendered before the
/// mutex is taken, so a [`Display`][fmt::Display] implementation may itself log through the same
/// logger.
///
/// # Example
///
/// ```
/// use rolling_log::{Level, Logger};
///
/// let logger = Logger::new(Level::Warning, Vec::new());
/// logger.warning("disk almost full").expect("write to memory");
/// logger.notice("not written, NOTICE is below WARNING").expect("write to memory");
/// ```
pub struct Logger {
    threshold: AtomicU8,
    utc_offset: UtcOffset,
    output: Mutex<Output>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("utc_offset", &self.utc_offset)
            .finish_non_exhaustive()
    }
}

macro_rules! leveled_methods {
    ($($level:ident => $plain:ident, $formatted:ident;)+) => {
        $(
            #[doc = concat!("Emits `message` at [`Level::", stringify!($level), "`].")]
            ///
            /// The record is attributed to the caller of this method.
            ///
            /// # Errors
            ///
            /// Returns [`LogError::Format`] if the message fails to render, and [`LogError::Write`]
            /// if the output rejects the record.
            #[track_caller]
            pub fn $plain(&self, message: impl fmt::Display) -> Result<(), LogError> {
                self.emit(Level::$level, Some(Location::caller()), format_args!("{message}"))
            }

            #[doc = concat!("Emits pre-formatted `args` at [`Level::", stringify!($level), "`].")]
            ///
            /// The record is attributed to the caller of this method.
            ///
            /// # Errors
            ///
            /// Returns [`LogError::Format`] if the message fails to render, and [`LogError::Write`]
            /// if the output rejects the record.
            #[track_caller]
            pub fn $formatted(&self, args: fmt::Arguments<'_>) -> Result<(), LogError> {
                self.emit(Level::$level, Some(Location::caller()), args)
            }
        )+
    };
}

impl Logger {
    /// Creates a logger with the given threshold that writes to `writer`.
    ///
    /// Timestamps are rendered in the local UTC offset if it can be determined at this point,
    /// and in UTC otherwise. The local offset cannot be determined once a Unix process runs
    /// several threads; use [`Logger::with_utc_offset`] there.
    pub fn new(level: Level, writer: impl Write + Send + 'static) -> Self {
        let utc_offset = UtcOffset::current_local_offset().unwrap_or_else(|error| {
            tracing::debug!(%error, "Local UTC offset unavailable, logging timestamps in UTC");
            UtcOffset::UTC
        });

        Self {
            threshold: AtomicU8::new(level.ordinal()),
            utc_offset,
            output: Mutex::new(Output {
                writer: Box::new(writer),
                generation: 0,
            }),
        }
    }

    /// Creates a logger with the given threshold that writes to standard error.
    pub fn stderr(level: Level) -> Self {
        Self::new(level, io::stderr())
    }

    /// Renders timestamps in `offset` instead of the offset detected at construction.
    #[must_use]
    pub fn with_utc_offset(mut self, offset: UtcOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// The UTC offset timestamps are rendered in.
    pub fn utc_offset(&self) -> UtcOffset {
        self.utc_offset
    }

    /// The current time in the logger's UTC offset.
    pub fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.utc_offset)
    }

    /// Sets the threshold. Every level from [`Level::Fatal`] up to `level` is enabled afterwards,
    /// all others are disabled. [`Level::None`] disables all output.
    pub fn set_level(&self, level: Level) {
        self.threshold.store(level.ordinal(), Ordering::Release);
    }

    /// The current threshold.
    pub fn level(&self) -> Level {
        Level::try_from(self.threshold.load(Ordering::Acquire)).unwrap_or(Level::None)
    }

    /// Returns `true` if records at `level` are currently written.
    pub fn is_enabled(&self, level: Level) -> bool {
        level != Level::None && level.ordinal() <= self.threshold.load(Ordering::Acquire)
    }

    /// Replaces the output. Records emitted after this call returns go to `writer`; the previous
    /// output is flushed and dropped.
    pub fn set_output(&self, writer: impl Write + Send + 'static) {
        self.install_output(Box::new(writer));
    }

    /// Low-level entry point taking a raw level ordinal and an explicit call site.
    ///
    /// `location` is rendered as `???:0` when `None`. Prefer the level-specific methods, which
    /// capture the call site themselves.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidLevel`] if `level` is greater than the ordinal of
    /// [`Level::Debug`], [`LogError::Format`] if the message fails to render, and
    /// [`LogError::Write`] if the output rejects the record.
    pub fn output(
        &self,
        level: u8,
        location: Option<&Location<'_>>,
        args: fmt::Arguments<'_>,
    ) -> Result<(), LogError> {
        let level = Level::try_from(level)?;
        self.emit(level, location, args)
    }

    /// Emits `message` at `level`, attributed to the caller of this method.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Format`] if the message fails to render, and [`LogError::Write`] if the
    /// output rejects the record.
    #[track_caller]
    pub fn log(&self, level: Level, message: impl fmt::Display) -> Result<(), LogError> {
        self.emit(level, Some(Location::caller()), format_args!("{message}"))
    }

    /// Emits pre-formatted `args` at `level`, attributed to the caller of this method.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Format`] if the message fails to render, and [`LogError::Write`] if the
    /// output rejects the record.
    #[track_caller]
    pub fn logf(&self, level: Level, args: fmt::Arguments<'_>) -> Result<(), LogError> {
        self.emit(level, Some(Location::caller()), args)
    }

    leveled_methods! {
        Fatal => fatal, fatalf;
        Warning => warning, warningf;
        Notice => notice, noticef;
        Trace => trace, tracef;
        Debug => debug, debugf;
    }

    fn emit(
        &self,
        level: Level,
        location: Option<&Location<'_>>,
        message: fmt::Arguments<'_>,
    ) -> Result<(), LogError> {
        if !self.is_enabled(level) {
            return Ok(());
        }

        let record = Record::new(level, self.now(), current_unit_id(), location, message);

        // A record logged from within the message's own rendering finds the slot empty and
        // renders into a fresh buffer.
        let mut buffer = SCRATCH.try_with(Cell::take).unwrap_or_default();
        buffer.clear();
        let result = self.write_record(&mut buffer, &record);
        if buffer.capacity() <= RETAINED_BUFFER_CAPACITY {
            // Fails only while the thread is being torn down.
            let _ = SCRATCH.try_with(|scratch| scratch.set(buffer));
        }
        result
    }

    fn write_record(&self, buffer: &mut Vec<u8>, record: &Record<'_>) -> Result<(), LogError> {
        format_record(buffer, record)?;
        self.output.lock().writer.write_all(buffer)?;
        Ok(())
    }

    pub(crate) fn install_output(&self, writer: Box<dyn Write + Send>) -> OutputGeneration {
        let mut output = self.lock_output();
        output.replace(writer);
        output.0.generation += 1;
        OutputGeneration(output.0.generation)
    }

    pub(crate) fn lock_output(&self) -> OutputGuard<'_> {
        OutputGuard(self.output.lock())
    }
}
