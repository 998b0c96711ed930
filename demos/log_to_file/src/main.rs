//! Writes all logs to `./log/example.log`, rotated daily, with archives kept for 7 days.

use std::{path::Path, sync::Arc};

use rolling_log::{notice, set_up_file_logger, trace, warning, Level, Logger};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Problems of the rotation thread are reported through `tracing`.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let logger = Arc::new(Logger::stderr(Level::Debug));
    let sink = set_up_file_logger(logger.clone(), "./log", "example", None)?;
    logger.set_level(Level::Trace);

    announce(sink.active_path());

    rolling_log::debug!(logger, "this message won't show")?;
    trace!(logger, "this is a trace message")?;
    notice!(logger, "log levels: FATAL > WARNING > NOTICE > TRACE > DEBUG")?;
    warning!(logger, "this is a warning message")?;

    sink.shutdown();
    Ok(())
}

#[allow(clippy::print_stdout)]
fn announce(path: &Path) {
    println!("all logs will be written to {}", path.display());
}
