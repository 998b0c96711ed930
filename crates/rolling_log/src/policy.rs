//! Rotation policies decide, once per check, whether the active log file should be archived.

use std::{fmt, fs, path::Path};

use time::{Date, OffsetDateTime};

/// Decides whether the active log file should be rotated now.
///
/// A policy is evaluated once per check of the file sink, with the time of the check and the
/// absolute path of the active log file. Any `FnMut(&OffsetDateTime, &Path) -> bool` closure is a
/// policy:
///
/// ```
/// use rolling_log::RotationPolicy;
///
/// let mut never = |_now: &time::OffsetDateTime, _path: &std::path::Path| false;
/// assert!(!never.should_rotate(&time::OffsetDateTime::now_utc(), "app.log".as_ref()));
/// ```
pub trait RotationPolicy: Send {
    /// Returns `true` if the active log file should be archived and reopened.
    fn should_rotate(&mut self, now: &OffsetDateTime, active_path: &Path) -> bool;
}

impl<F> RotationPolicy for F
where
    F: FnMut(&OffsetDateTime, &Path) -> bool + Send,
{
    fn should_rotate(&mut self, now: &OffsetDateTime, active_path: &Path) -> bool {
        self(now, active_path)
    }
}

impl fmt::Debug for dyn RotationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RotationPolicy")
    }
}

/// Rotates once per calendar day.
///
/// The policy remembers the day it last saw. The first check that falls on a different day
/// updates that day and requests a rotation, so records written between midnight and that check
/// still land in the previous day's file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyPolicy {
    today: Date,
}

impl DailyPolicy {
    /// Creates a policy that considers the date of `now` as the current day.
    pub fn new(now: OffsetDateTime) -> Self {
        Self { today: now.date() }
    }

    /// The day the policy currently considers as today.
    pub fn today(&self) -> Date {
        self.today
    }
}

impl RotationPolicy for DailyPolicy {
    fn should_rotate(&mut self, now: &OffsetDateTime, _active_path: &Path) -> bool {
        let day = now.date();
        if day == self.today {
            return false;
        }
        self.today = day;
        true
    }
}

/// Rotates when the active log file has reached a size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimitPolicy {
    max_bytes: u64,
}

impl SizeLimitPolicy {
    /// Creates a policy rotating files of at least `max_bytes` bytes.
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

impl RotationPolicy for SizeLimitPolicy {
    fn should_rotate(&mut self, _now: &OffsetDateTime, active_path: &Path) -> bool {
        match fs::metadata(active_path) {
            Ok(metadata) => metadata.len() >= self.max_bytes,
            Err(error) => {
                tracing::debug!(
                    path = %active_path.display(),
                    %error,
                    "Failed to read log file size, skipping rotation"
                );
                false
            }
        }
    }
}
