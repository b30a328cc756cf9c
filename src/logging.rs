//! Writing `tracing` events to a log file.  The terminal is taken up by the
//! game, so nothing is ever logged to stdout or stderr.
use crate::config::LogConfig;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

/// Install a global subscriber that writes to the log file described by
/// `config`.  Returns the path of the log file, or `None` if logging is
/// disabled.
///
/// # Errors
///
/// Returns `Err` if the log file could not be opened or a global subscriber
/// has already been installed.
pub(crate) fn init(config: &LogConfig) -> Result<Option<PathBuf>, LoggingError> {
    if !config.enabled {
        return Ok(None);
    }
    let path = match config.file {
        Some(ref p) => p.clone(),
        None => LogConfig::default_file().ok_or(LoggingError::NoPath)?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent).map_err(LoggingError::Open)?;
    }
    let file = fs_err::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(LoggingError::Open)?;
    tracing_subscriber::fmt()
        .with_max_level(config.level.filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(LoggingError::Install)?;
    Ok(Some(path))
}

#[derive(Debug, Error)]
pub(crate) enum LoggingError {
    #[error("failed to determine path to local data directory")]
    NoPath,
    #[error("failed to open log file")]
    Open(#[source] std::io::Error),
    #[error("failed to set up logging")]
    Install(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}
