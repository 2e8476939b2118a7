use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Set up tracing into a file; stdout belongs to the TUI. Returns the
/// appender guard, which must stay alive so buffered logs flush on exit.
/// Without a log file, logging stays disabled entirely.
pub fn init(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let Some(path) = log_file else {
        return Ok(None);
    };
    let dir = path.parent().unwrap_or(Path::new("."));
    let file = path
        .file_name()
        .context("log file path has no file name")?;
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, file);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "sellog=debug".into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}
