use std::fs;
use std::path::{Path, PathBuf};
use std::{env, io};

use chrono::Local;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Log to stderr and to a fresh `rename_YYYYMMDD_HHMMSS.log` in `log_dir`.
/// Keep the returned guard alive until the run ends so the file is flushed.
pub fn init_logger(log_dir: &Path) -> io::Result<(WorkerGuard, PathBuf)> {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter_layer = EnvFilter::new(filter);

    fs::create_dir_all(log_dir)?;
    let file_name = format!("rename_{}.log", Local::now().format("%Y%m%d_%H%M%S"));
    let log_file = log_dir.join(&file_name);

    let file_appender = tracing_appender::rolling::never(log_dir, &file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // stdout is reserved for the preview so JSON output stays clean
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .pretty()
                .with_file(false)
                .with_line_number(false)
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(false)
                .with_ansi(false),
        )
        .with(filter_layer)
        .init();

    info!("Log file: {}", log_file.display());

    Ok((guard, log_file))
}
