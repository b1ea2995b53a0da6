//! Tracing subscriber setup for the binaries.

use std::{fs::OpenOptions, path::Path, sync::Arc};

use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::Error;

/// Install the global tracing subscriber.
///
/// Logs go to stderr at the level set by `RUST_LOG`, `info` by default, so
/// that stdout only carries the report. If `debug_log` is given, debug logs
/// are also appended to that file.
///
/// # Errors
/// Returns [Error::Logging] if the log file cannot be opened or a subscriber
/// is already installed.
pub fn init_logging(debug_log: Option<&Path>) -> Result<(), Error> {
    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let debug_log = debug_log
        .map(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|error| {
                    Error::Logging(format!("could not open {}: {error}", path.display()))
                })
        })
        .transpose()?
        .map(|log_file| {
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_ansi(false)
                .with_writer(Arc::new(log_file))
                .with_filter(LevelFilter::DEBUG)
        });

    tracing_subscriber::registry()
        .with(stderr_log)
        .with(debug_log)
        .try_init()
        .map_err(|error| Error::Logging(error.to_string()))
}
