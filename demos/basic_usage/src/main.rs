//! Logs to standard error at the NOTICE threshold, from the main thread and a worker thread.
//!
//! The third field of every line is the id of the emitting thread.

use std::{thread, time::Duration};

use rolling_log::{default_logger, fatal, notice, trace, warning, Level, LogError};

fn main() -> Result<(), LogError> {
    let logger = default_logger();
    logger.set_level(Level::Notice);

    rolling_log::debug!(logger, "this message won't show")?;
    trace!(logger, "this message won't show either")?;
    notice!(logger, "hi, the answer is:", 42)?;
    warning!(logger, "this is a warning message")?;
    fatal!(logger, "all logs go to standard error by default")?;

    let worker = thread::spawn(|| -> Result<(), LogError> {
        let logger = default_logger();
        notice!(logger, "note the third field of a log line is the thread id")?;
        thread::sleep(Duration::from_millis(10));
        notice!(logger, "this thread's id differs from the main thread's")
    });

    log_in_function()?;

    thread::sleep(Duration::from_millis(10));
    notice!(logger, "in main")?;

    match worker.join() {
        Ok(result) => result,
        Err(_) => rolling_log::fatalf!(logger, "worker thread panicked"),
    }
}

fn log_in_function() -> Result<(), LogError> {
    notice!(default_logger(), "log in log_in_function()")
}
