//! End-to-end tests of a logger writing through a rotating file sink.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::Duration,
};

use rolling_log::{
    current_unit_id, notice, set_up_file_logger, FileLoggerConfig, FileSink, Level, Logger,
    OffsetDateTime,
};
use time::macros::datetime;

const DAY: Duration = Duration::from_secs(86_400);

fn init_diagnostics() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn files_in(directory: &Path) -> Vec<PathBuf> {
    let mut files = fs::read_dir(directory)
        .expect("list log directory")
        .map(|entry| entry.expect("read directory entry").path())
        .collect::<Vec<_>>();
    files.sort();
    files
}

#[test]
fn notice_is_appended_to_the_active_file() {
    init_diagnostics();
    let root = tempfile::tempdir().expect("create temporary directory");
    let directory = root.path().join("log");
    let logger = Arc::new(Logger::stderr(Level::Debug));

    let handle =
        set_up_file_logger(logger.clone(), &directory, "app", None).expect("set up file logger");
    assert_eq!(handle.active_path(), directory.join("app.log"));

    let line = line!() + 1;
    notice!(logger, "x").expect("write log file");

    let contents = fs::read_to_string(directory.join("app.log")).expect("read log file");
    let fields = contents.splitn(5, ": ").collect::<Vec<_>>();
    assert_eq!(fields.first().copied(), Some("NOTICE"));
    assert_eq!(
        fields.get(2).copied(),
        Some(format!("g={}", current_unit_id()).as_str())
    );
    assert_eq!(
        fields.get(3).copied(),
        Some(format!("file_logger.rs:{line}").as_str())
    );
    assert_eq!(fields.get(4).copied(), Some("x\n"));
    assert_eq!(files_in(&directory), [directory.join("app.log")]);

    handle.shutdown().expect("rotation thread did not panic");
}

#[test]
fn threshold_applies_to_file_output() {
    init_diagnostics();
    let directory = tempfile::tempdir().expect("create temporary directory");
    let logger = Arc::new(Logger::stderr(Level::Debug));
    let never = |_: &OffsetDateTime, _: &Path| false;
    let sink = FileSink::open(
        logger.clone(),
        FileLoggerConfig::new(directory.path(), "app"),
        Some(Box::new(never)),
    )
    .expect("set up file sink");

    logger.set_level(Level::Warning);
    logger.warning("def").expect("write log file");
    logger.notice("abc").expect("write log file");
    logger.set_level(Level::None);
    logger.fatal("silenced").expect("write log file");

    let contents = fs::read_to_string(sink.active_path()).expect("read log file");
    assert_eq!(contents.lines().count(), 1);
    assert!(contents.starts_with("WARNING: "));
    assert!(contents.ends_with(": def\n"));
}

#[test]
fn no_record_is_lost_while_rotating_under_load() {
    const THREADS: usize = 4;
    const RECORDS: usize = 500;
    const ROTATIONS: i64 = 20;

    init_diagnostics();
    let directory = tempfile::tempdir().expect("create temporary directory");
    let logger = Arc::new(Logger::stderr(Level::Debug));
    let always = |_: &OffsetDateTime, _: &Path| true;
    let mut sink = FileSink::open(
        logger.clone(),
        FileLoggerConfig::new(directory.path(), "app"),
        Some(Box::new(always)),
    )
    .expect("set up file sink");

    let start = datetime!(2024-06-01 00:00 UTC);
    thread::scope(|scope| {
        for writer in 0..THREADS {
            let logger = &logger;
            scope.spawn(move || {
                for record in 0..RECORDS {
                    rolling_log::noticef!(logger, "writer {writer} record {record}")
                        .expect("write log file");
                }
            });
        }

        for second in 0..ROTATIONS {
            let outcome = sink.tick(start + time::Duration::seconds(second));
            assert!(outcome.archived.is_some(), "rotation {second} failed");
            thread::sleep(Duration::from_millis(1));
        }
    });

    let files = files_in(directory.path());
    assert_eq!(files.len(), usize::try_from(ROTATIONS).expect("small count") + 1);

    let mut total = 0;
    for file in files {
        let contents = fs::read_to_string(&file).expect("read log file");
        for line in contents.lines() {
            let fields = line.splitn(5, ": ").collect::<Vec<_>>();
            assert_eq!(fields.len(), 5, "malformed line in {}: {line:?}", file.display());
            assert!(fields
                .get(4)
                .is_some_and(|message| message.starts_with("writer ")));
            total += 1;
        }
    }
    assert_eq!(total, THREADS * RECORDS);
}

#[test]
fn archives_expire_but_the_active_file_and_other_prefixes_stay() {
    init_diagnostics();
    let directory = tempfile::tempdir().expect("create temporary directory");
    let logger = Arc::new(Logger::stderr(Level::Debug));
    let mut ticks = 0;
    let second_tick = move |_: &OffsetDateTime, _: &Path| {
        ticks += 1;
        ticks == 2
    };
    let mut sink = FileSink::open(
        logger.clone(),
        FileLoggerConfig::new(directory.path(), "app"),
        Some(Box::new(second_tick)),
    )
    .expect("set up file sink");
    let foreign = directory.path().join("other.log");
    fs::write(&foreign, "kept\n").expect("write foreign log file");

    let now = OffsetDateTime::now_utc();
    logger.notice("archived soon").expect("write log file");
    assert_eq!(sink.tick(now).archived, None);

    let archive = sink.tick(now).archived.expect("second tick rotates");
    assert!(archive.exists());
    assert!(sink.active_path().exists());

    // Nothing is old enough yet.
    assert!(sink.tick(now).removed.is_empty());

    let later = now + time::Duration::try_from(8 * DAY).expect("duration in range");
    let outcome = sink.tick(later);
    assert_eq!(outcome.removed, [archive.clone()]);
    assert!(!archive.exists());
    assert!(sink.active_path().exists());
    assert!(foreign.exists());
}
