//! File logging. The terminal belongs to the UI, so everything goes to a file.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Args;

const LOG_PREFIX: &str = "fleetdash.log";

/// Install the global subscriber. Keep the returned guard alive until exit or
/// buffered lines are lost.
pub fn init(args: &Args) -> anyhow::Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let writer = match args.log_file {
        Some(ref path) => {
            let (dir, file) = split_path(path);
            tracing_appender::rolling::never(dir, file)
        }
        None => tracing_appender::rolling::daily(std::env::temp_dir(), LOG_PREFIX),
    };
    let (nb, guard) = tracing_appender::non_blocking(writer);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(nb).with_ansi(false).with_filter(filter))
        .try_init()?;
    Ok(guard)
}

fn split_path(path: &Path) -> (PathBuf, PathBuf) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(LOG_PREFIX));
    (dir, file)
}
