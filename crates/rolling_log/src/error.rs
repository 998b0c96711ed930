//! Error types returned by the logger and the file sink.

use std::{fmt, io, path::PathBuf};

/// Errors returned when emitting a record or converting a level.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// A level ordinal outside of `NONE..=DEBUG` was passed to a low-level entry point.
    #[error("Invalid log level ordinal: {0}")]
    InvalidLevel(u8),

    /// A level name that does not match any of the known levels.
    #[error("Unknown log level name: `{0}`")]
    UnknownLevelName(String),

    /// A value in the message failed to render itself. Nothing was written.
    #[error("Failed to format log record: {0}")]
    Format(#[from] fmt::Error),

    /// Writing the formatted record to the current output failed.
    #[error("Failed to write log record: {0}")]
    Write(#[from] io::Error),
}

/// Errors that can occur while setting up the file sink.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The log directory could not be resolved to an absolute path.
    #[error("Failed to resolve log directory `{}`: {source}", path.display())]
    PathResolution {
        /// The directory as given by the caller.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The log directory (or one of its parents) could not be created.
    #[error("Failed to create log directory `{}`: {source}", path.display())]
    DirectoryCreate {
        /// The absolute directory path.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The active log file could not be opened for appending.
    #[error("Failed to open log file `{}`: {source}", path.display())]
    FileOpen {
        /// The active log file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The background rotation thread could not be spawned.
    #[error("Failed to spawn log rotation thread: {0}")]
    Spawn(#[source] io::Error),
}
