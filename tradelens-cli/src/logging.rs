//! Scoped log subscriber for one CLI command.
//!
//! Stage progress goes to stdout in compact form and, for commands that
//! produce outputs, to `<output_dir>/tradelens.log` through a non-blocking
//! writer. The subscriber is only installed for the duration of the
//! command; the writer guard is dropped (and the file flushed) when it
//! returns.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// `debug` with `--verbose`, otherwise `RUST_LOG` falling back to `info`.
pub fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(dir).with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let name = path
        .file_name()
        .with_context(|| format!("log path {} has no file name", path.display()))?;
    Ok(tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name)))
}

/// Run `f` with logging to stdout and, when `log_file` is given, to that file.
pub fn with_logging<T>(log_file: Option<&Path>, verbose: bool, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let (file_layer, _guard) = match log_file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            let layer = fmt::layer().with_ansi(false).with_target(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(fmt::layer().compact().with_target(false))
        .with(file_layer);

    tracing::subscriber::with_default(subscriber, f)
}
