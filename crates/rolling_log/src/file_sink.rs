//! Routes a [`Logger`]'s output to a log file that is rotated and pruned in the background.
//!
//! The active file is always `<directory>/<prefix>.log`. Whenever the rotation policy asks for
//! it, the active file is renamed to `<directory>/<prefix>.log.<YYYY-MM-DD_HH-MM-SS>` and a fresh
//! active file is opened in its place. The rename, the reopen and the writer swap happen while the
//! logger's output lock is held, so every record ends up complete in exactly one of the two files.
//!
//! Failures of the background task never reach the logger's own output; they are reported as
//! `tracing` events and the task carries on.

use std::{
    ffi::OsString,
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::{
        mpsc::{self, Receiver, RecvTimeoutError, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, SystemTime},
};

use time::{format_description::BorrowedFormatItem, macros::format_description, OffsetDateTime};

use crate::{
    logger::OutputGeneration,
    policy::{DailyPolicy, RotationPolicy},
    retention, FileLoggerConfig, Logger, SetupError, MIN_CHECK_INTERVAL,
};

/// Suffix appended to the active file name when it is archived.
const ARCHIVE_SUFFIX_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");

const ROTATION_THREAD_NAME: &str = "rolling-log-rotation";

/// What one check of the file sink did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Path the active file was archived to, if it was rotated.
    pub archived: Option<PathBuf>,

    /// Expired files deleted by the retention sweep.
    pub removed: Vec<PathBuf>,
}

/// A log file installed as the output of a [`Logger`].
///
/// [`FileSink::open`] installs the file; [`FileSink::tick`] performs a single rotation check and
/// retention sweep. Most applications call [`set_up_file_logger`] or [`FileSink::spawn`] instead,
/// which run the checks periodically on a background thread.
#[derive(Debug)]
pub struct FileSink {
    logger: Arc<Logger>,
    directory: PathBuf,
    prefix: String,
    active_path: PathBuf,
    file_mode: u32,
    retention: Duration,
    check_interval: Duration,
    policy: Box<dyn RotationPolicy>,
    generation: OutputGeneration,
}

impl FileSink {
    /// Opens the active log file described by `config` and installs it as `logger`'s output.
    ///
    /// The log directory is created (with its parents) if needed. If `policy` is `None`, the file
    /// is rotated daily.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if the directory cannot be resolved or created, or the log file
    /// cannot be opened. The logger's output is left untouched in that case.
    pub fn open(
        logger: Arc<Logger>,
        config: FileLoggerConfig,
        policy: Option<Box<dyn RotationPolicy>>,
    ) -> Result<Self, SetupError> {
        let directory =
            std::path::absolute(&config.directory).map_err(|source| SetupError::PathResolution {
                path: config.directory.clone(),
                source,
            })?;

        create_log_directory(&directory, config.dir_mode).map_err(|source| {
            SetupError::DirectoryCreate {
                path: directory.clone(),
                source,
            }
        })?;

        let active_path = directory.join(format!("{}.log", config.file_name_prefix));
        let file = open_log_file(&active_path, config.file_mode).map_err(|source| {
            SetupError::FileOpen {
                path: active_path.clone(),
                source,
            }
        })?;

        let policy = policy.unwrap_or_else(|| Box::new(DailyPolicy::new(logger.now())));
        let generation = logger.install_output(Box::new(file));

        Ok(Self {
            logger,
            directory,
            prefix: config.file_name_prefix,
            active_path,
            file_mode: config.file_mode,
            retention: config.retention,
            check_interval: config.check_interval.max(MIN_CHECK_INTERVAL),
            policy,
            generation,
        })
    }

    /// The absolute log directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The absolute path of the active log file.
    pub fn active_path(&self) -> &Path {
        &self.active_path
    }

    /// Runs one check: rotates the active file if the policy asks for it, then deletes expired
    /// archives. The sweep runs even if the rotation failed.
    pub fn tick(&mut self, now: OffsetDateTime) -> TickOutcome {
        let archived = if self.policy.should_rotate(&now, &self.active_path) {
            self.rotate(now)
        } else {
            None
        };

        let swept = retention::sweep(
            &self.directory,
            &self.prefix,
            &self.active_path,
            self.retention,
            SystemTime::from(now),
        );

        TickOutcome {
            archived,
            removed: swept.removed,
        }
    }

    /// Moves the sink onto a background thread that calls [`FileSink::tick`] immediately and then
    /// once per check interval.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Spawn`] if the thread cannot be created. The log file stays
    /// installed as the logger's output, without rotation.
    pub fn spawn(self) -> Result<FileSinkHandle, SetupError> {
        let directory = self.directory.clone();
        let active_path = self.active_path.clone();
        let (stop, stop_receiver) = mpsc::channel();

        let worker = thread::Builder::new()
            .name(ROTATION_THREAD_NAME.to_string())
            .spawn(move || self.run(stop_receiver))
            .map_err(SetupError::Spawn)?;

        Ok(FileSinkHandle {
            directory,
            active_path,
            stop,
            worker,
        })
    }

    fn run(mut self, stop_receiver: Receiver<()>) -> Self {
        let interval = self.check_interval;
        let mut stop_receiver = Some(stop_receiver);
        loop {
            let outcome = self.tick(self.logger.now());
            if let Some(archive) = &outcome.archived {
                tracing::debug!(archive = %archive.display(), "Rotated log file");
            }

            match stop_receiver.as_ref().map(|receiver| receiver.recv_timeout(interval)) {
                Some(Ok(())) => break,
                Some(Err(RecvTimeoutError::Timeout)) => {}
                // The handle was dropped: keep running for the rest of the process.
                Some(Err(RecvTimeoutError::Disconnected)) => {
                    stop_receiver = None;
                    thread::sleep(interval);
                }
                None => thread::sleep(interval),
            }
        }
        self
    }

    fn rotate(&mut self, now: OffsetDateTime) -> Option<PathBuf> {
        let archive_path = match archive_path(&self.active_path, now) {
            Ok(path) => path,
            Err(error) => {
                tracing::warn!(%error, "Failed to format log archive name");
                return None;
            }
        };
        if archive_path.exists() {
            tracing::warn!(
                archive = %archive_path.display(),
                "Log archive already exists, skipping rotation"
            );
            return None;
        }

        // No record may be written between the rename and the swap.
        let mut output = self.logger.lock_output();

        if let Err(error) = fs::rename(&self.active_path, &archive_path) {
            tracing::warn!(
                path = %self.active_path.display(),
                archive = %archive_path.display(),
                %error,
                "Failed to archive log file"
            );
            return None;
        }

        if output.is_installed(self.generation) {
            match open_log_file(&self.active_path, self.file_mode) {
                Ok(file) => output.replace(Box::new(file)),
                Err(error) => tracing::warn!(
                    path = %self.active_path.display(),
                    %error,
                    "Failed to reopen log file, records keep going to the archive"
                ),
            }
        }

        Some(archive_path)
    }
}

/// Handle to a [`FileSink`] running on its background thread.
///
/// Dropping the handle detaches the thread, which then keeps rotating for the lifetime of the
/// process. Call [`FileSinkHandle::shutdown`] to stop it.
#[derive(Debug)]
pub struct FileSinkHandle {
    directory: PathBuf,
    active_path: PathBuf,
    stop: Sender<()>,
    worker: JoinHandle<FileSink>,
}

impl FileSinkHandle {
    /// The absolute log directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The absolute path of the active log file.
    pub fn active_path(&self) -> &Path {
        &self.active_path
    }

    /// Stops the background thread and waits for it to finish its current check.
    ///
    /// The log file stays installed as the logger's output. Returns the sink so that checks can
    /// be run manually, or `None` if the background thread panicked.
    pub fn shutdown(self) -> Option<FileSink> {
        // The thread may already be gone, in which case there is nobody to notify.
        let _ = self.stop.send(());
        self.worker.join().ok()
    }
}

/// Appends `logger`'s output to `<directory>/<prefix>.log` and starts rotating that file in the
/// background, using the default [`FileLoggerConfig`].
///
/// If `policy` is `None`, the file is rotated daily. Archives older than 7 days are deleted.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use rolling_log::{notice, set_up_file_logger, Level, Logger};
///
/// let logger = Arc::new(Logger::stderr(Level::Trace));
/// let _sink = set_up_file_logger(logger.clone(), "./log", "example", None)?;
///
/// notice!(logger, "all logs will write to", "./log/example.log")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// Returns [`SetupError`] if the directory cannot be resolved or created, the log file cannot be
/// opened, or the background thread cannot be spawned.
pub fn set_up_file_logger(
    logger: Arc<Logger>,
    directory: impl Into<PathBuf>,
    prefix: impl Into<String>,
    policy: Option<Box<dyn RotationPolicy>>,
) -> Result<FileSinkHandle, SetupError> {
    FileSink::open(logger, FileLoggerConfig::new(directory, prefix), policy)?.spawn()
}

fn archive_path(active_path: &Path, now: OffsetDateTime) -> Result<PathBuf, time::error::Format> {
    let suffix = now.format(ARCHIVE_SUFFIX_FORMAT)?;
    let mut name = OsString::from(active_path.as_os_str());
    name.push(".");
    name.push(suffix);
    Ok(PathBuf::from(name))
}

fn create_log_directory(directory: &Path, mode: u32) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(directory)
}

fn open_log_file(path: &Path, mode: u32) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    options.open(path)
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Instant,
    };

    use time::macros::datetime;

    use super::*;
    use crate::{logger::tests::SharedBuffer, Level};

    const DAY: Duration = Duration::from_secs(86_400);

    fn never(_: &OffsetDateTime, _: &Path) -> bool {
        false
    }

    fn always(_: &OffsetDateTime, _: &Path) -> bool {
        true
    }

    fn open_sink(
        directory: &Path,
        policy: impl RotationPolicy + 'static,
    ) -> (Arc<Logger>, FileSink) {
        let logger = Arc::new(Logger::new(Level::Debug, io::sink()));
        let sink = FileSink::open(
            logger.clone(),
            FileLoggerConfig::new(directory, "test"),
            Some(Box::new(policy)),
        )
        .expect("set up file sink");
        (logger, sink)
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).expect("read log file")
    }

    #[test]
    fn open_creates_directory_and_installs_the_file() {
        let root = tempfile::tempdir().expect("create temporary directory");
        let directory = root.path().join("nested").join("log");
        let (logger, sink) = open_sink(&directory, never);

        assert_eq!(sink.directory(), directory);
        assert_eq!(sink.active_path(), directory.join("test.log"));

        logger.notice("abc").expect("write log file");
        let contents = read(sink.active_path());
        assert!(contents.starts_with("NOTICE: "));
        assert!(contents.contains(": file_sink.rs:"));
        assert!(contents.ends_with(": abc\n"));
        assert_eq!(contents.lines().count(), 1);
    }

    #[test]
    fn open_appends_to_an_existing_file() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        fs::write(directory.path().join("test.log"), "previous line\n").expect("seed log file");

        let (logger, sink) = open_sink(directory.path(), never);
        logger.warning("next line").expect("write log file");

        let contents = read(sink.active_path());
        assert!(contents.starts_with("previous line\nWARNING: "));
        assert!(contents.ends_with(": next line\n"));
    }

    #[test]
    fn setup_failures_are_classified() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        let logger = Arc::new(Logger::new(Level::Debug, io::sink()));

        let result = FileSink::open(logger.clone(), FileLoggerConfig::new("", "test"), None);
        assert!(matches!(result, Err(SetupError::PathResolution { .. })));

        let not_a_directory = directory.path().join("file");
        fs::write(&not_a_directory, "").expect("create plain file");
        let result = FileSink::open(
            logger.clone(),
            FileLoggerConfig::new(not_a_directory.join("log"), "test"),
            None,
        );
        assert!(matches!(result, Err(SetupError::DirectoryCreate { .. })));

        fs::create_dir(directory.path().join("test.log")).expect("create blocking directory");
        let result = FileSink::open(logger, FileLoggerConfig::new(directory.path(), "test"), None);
        assert!(matches!(
            result,
            Err(SetupError::FileOpen { path, .. }) if path == directory.path().join("test.log")
        ));
    }

    #[cfg(unix)]
    #[test]
    fn files_are_created_with_the_configured_mode() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().expect("create temporary directory");
        let directory = root.path().join("log");
        let logger = Arc::new(Logger::new(Level::Debug, io::sink()));
        let config = FileLoggerConfig::new(&directory, "test")
            .with_dir_mode(0o700)
            .with_file_mode(0o600);
        let sink = FileSink::open(logger, config, Some(Box::new(never))).expect("set up sink");

        let mode = |path: &Path| {
            fs::metadata(path)
                .expect("stat log path")
                .permissions()
                .mode()
                & 0o777
        };
        assert_eq!(mode(&directory), 0o700);
        assert_eq!(mode(sink.active_path()), 0o600);
    }

    #[test]
    fn rotation_archives_and_reopens_the_active_file() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        let mut ticks = 0;
        let third_tick = move |_: &OffsetDateTime, _: &Path| {
            ticks += 1;
            ticks == 3
        };
        let (logger, mut sink) = open_sink(directory.path(), third_tick);
        let now = datetime!(2024-05-17 09:08:07 UTC);

        logger.notice("before rotation").expect("write log file");
        assert_eq!(sink.tick(now), TickOutcome::default());
        assert_eq!(sink.tick(now), TickOutcome::default());

        let outcome = sink.tick(now);
        let archive = directory.path().join("test.log.2024-05-17_09-08-07");
        assert_eq!(outcome.archived.as_deref(), Some(archive.as_path()));

        logger.notice("after rotation").expect("write log file");
        let archived = read(&archive);
        let active = read(sink.active_path());
        assert_eq!(archived.lines().count(), 1);
        assert!(archived.ends_with(": before rotation\n"));
        assert_eq!(active.lines().count(), 1);
        assert!(active.ends_with(": after rotation\n"));
    }

    #[test]
    fn rotation_leaves_a_replaced_output_alone() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        let (logger, mut sink) = open_sink(directory.path(), always);
        logger.notice("to file").expect("write log file");

        let buffer = SharedBuffer::default();
        logger.set_output(buffer.clone());
        let outcome = sink.tick(datetime!(2024-05-17 00:00 UTC));
        logger.notice("to memory").expect("write to memory");

        assert!(outcome.archived.is_some());
        assert!(!sink.active_path().exists());
        assert!(buffer.contents().ends_with(": to memory\n"));
    }

    #[test]
    fn sweep_runs_even_when_the_rename_fails() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        let (_logger, mut sink) = open_sink(directory.path(), always);
        let now = datetime!(2024-05-17 12:00 UTC);

        let expired = directory.path().join("test.log.2024-05-01_00-00-00");
        File::create(&expired)
            .and_then(|file| file.set_modified(SystemTime::from(now) - 8 * DAY))
            .expect("create expired archive");
        fs::remove_file(sink.active_path()).expect("remove active file");

        let outcome = sink.tick(now);
        assert_eq!(outcome.archived, None);
        assert_eq!(outcome.removed, [expired.clone()]);
        assert!(!expired.exists());
    }

    #[test]
    fn existing_archive_is_never_overwritten() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        let (logger, mut sink) = open_sink(directory.path(), always);
        let now = datetime!(2024-05-17 12:00 UTC);

        assert!(sink.tick(now).archived.is_some());
        logger.notice("second file").expect("write log file");
        assert_eq!(sink.tick(now).archived, None);
        assert!(read(sink.active_path()).ends_with(": second file\n"));
    }

    #[test]
    fn background_thread_ticks_until_shut_down() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let counting = move |_: &OffsetDateTime, _: &Path| {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        };

        let logger = Arc::new(Logger::new(Level::Debug, io::sink()));
        let config = FileLoggerConfig::new(directory.path(), "test")
            .with_check_interval(Duration::from_millis(10));
        let handle = FileSink::open(logger, config, Some(Box::new(counting)))
            .expect("set up file sink")
            .spawn()
            .expect("spawn rotation thread");
        assert_eq!(handle.active_path(), directory.path().join("test.log"));

        let deadline = Instant::now() + Duration::from_secs(10);
        while ticks.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(ticks.load(Ordering::SeqCst) >= 3);

        let sink = handle.shutdown().expect("rotation thread did not panic");
        let stopped_at = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(ticks.load(Ordering::SeqCst), stopped_at);
        assert_eq!(sink.directory(), directory.path());
    }

    #[test]
    fn zero_check_interval_is_raised() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        let logger = Arc::new(Logger::new(Level::Debug, io::sink()));
        let mut config = FileLoggerConfig::new(directory.path(), "test");
        config.check_interval = Duration::ZERO;

        let sink = FileSink::open(logger, config, None).expect("set up file sink");
        assert_eq!(sink.check_interval, MIN_CHECK_INTERVAL);
    }

    #[test]
    fn archive_names_carry_the_tick_time() {
        let path = archive_path(
            Path::new("/var/log/app.log"),
            datetime!(2014-08-06 10:45:19.598 +8),
        )
        .expect("format archive name");
        assert_eq!(path, Path::new("/var/log/app.log.2014-08-06_10-45-19"));
    }
}
