//! Deletes archived log files that are older than the retention window.

use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

/// The files removed by one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Absolute paths of the files that were deleted.
    pub removed: Vec<PathBuf>,
}

/// Deletes the archives of `prefix` in `directory`, that is files named `<prefix>.log.<suffix>`,
/// whose last modification is older than `now - retention`.
///
/// The active log file and files of any other prefix (including prefixes that merely start with
/// `prefix`, such as `apple` for `app`) are never deleted. The sweep is best-effort:
/// listing and deletion failures are reported through `tracing` and otherwise ignored.
pub fn sweep(
    directory: &Path,
    prefix: &str,
    active_path: &Path,
    retention: Duration,
    now: SystemTime,
) -> SweepOutcome {
    let mut outcome = SweepOutcome::default();
    let archive_prefix = format!("{prefix}.log.");

    let Some(cutoff) = now.checked_sub(retention) else {
        return outcome;
    };

    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(error) => {
            tracing::warn!(
                directory = %directory.display(),
                %error,
                "Failed to list log directory"
            );
            return outcome;
        }
    };

    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if name.len() <= archive_prefix.len() || !name.starts_with(&archive_prefix) {
            continue;
        }

        let path = entry.path();
        if path == active_path {
            continue;
        }

        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        if modified >= cutoff {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed expired log file");
                outcome.removed.push(path);
            }
            Err(error) => {
                tracing::debug!(path = %path.display(), %error, "Failed to remove expired log file");
            }
        }
    }

    outcome
}
