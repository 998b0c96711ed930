//! Configuration of the file sink.

use std::{path::PathBuf, time::Duration};

/// Permission bits for a newly created log directory.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Permission bits for a newly created log file.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// How long archived log files are kept: 7 days.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(86_400 * 7);

/// How often the background task checks for rotation and expired files.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Shorter check intervals are raised to this value.
pub const MIN_CHECK_INTERVAL: Duration = Duration::from_millis(10);

/// Configuration for file logging.
///
/// Records are appended to `<directory>/<file_name_prefix>.log`. On rotation that file is renamed
/// to `<directory>/<file_name_prefix>.log.<YYYY-MM-DD_HH-MM-SS>` and a new one is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLoggerConfig {
    /// Directory where log files will be stored. Relative paths are resolved against the current
    /// working directory at setup.
    pub directory: PathBuf,

    /// Prefix for log file names. Archives named `<file_name_prefix>.log.<suffix>` are subject to
    /// retention.
    pub file_name_prefix: String,

    /// Permission bits used when creating the directory. Ignored on non-Unix platforms.
    pub dir_mode: u32,

    /// Permission bits used when creating the log file. Ignored on non-Unix platforms.
    pub file_mode: u32,

    /// Archived files whose last modification is older than this are deleted.
    pub retention: Duration,

    /// Interval between two checks of the background task, at least [`MIN_CHECK_INTERVAL`].
    pub check_interval: Duration,
}

impl FileLoggerConfig {
    /// Creates a configuration with default permissions, retention and check interval.
    pub fn new(directory: impl Into<PathBuf>, file_name_prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file_name_prefix: file_name_prefix.into(),
            dir_mode: DEFAULT_DIR_MODE,
            file_mode: DEFAULT_FILE_MODE,
            retention: DEFAULT_RETENTION,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }

    /// Sets the permission bits of the log directory.
    #[must_use]
    pub fn with_dir_mode(mut self, mode: u32) -> Self {
        self.dir_mode = mode;
        self
    }

    /// Sets the permission bits of log files.
    #[must_use]
    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    /// Sets how long archived files are kept.
    #[must_use]
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Sets the interval between two checks of the background task, raised to
    /// [`MIN_CHECK_INTERVAL`] if shorter.
    #[must_use]
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval.max(MIN_CHECK_INTERVAL);
        self
    }
}
