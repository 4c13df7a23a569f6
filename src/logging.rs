//! Logging init: console plus an optional per-run log file.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::output::print_warning;

/// Per-run log file `<log_dir>/<command>_<YYYYmmddHHMMSS>.log`.
pub fn log_file_path(log_dir: &Path, command: &str) -> PathBuf {
    log_dir.join(format!(
        "{}_{}.log",
        command,
        Local::now().format("%Y%m%d%H%M%S")
    ))
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize logging.
///
/// The console gets `info` (or `debug`, or `warn` when quiet) unless
/// `RUST_LOG` says otherwise. When `log_file` is given and can be opened,
/// it receives the same events without colors. Returns the log file path
/// actually in use.
pub fn init_logging(debug: bool, quiet: bool, log_file: Option<PathBuf>) -> Option<PathBuf> {
    let level = if debug { "debug" } else { "info" };
    let console_level = if quiet && !debug { "warn" } else { level };

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(console_level));
    let console = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let mut opened = None;
    let file_layer = log_file.and_then(|path| match open_log_file(&path) {
        Ok(file) => {
            opened = Some(path);
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false)
                    .with_filter(EnvFilter::new(level)),
            )
        }
        Err(e) => {
            print_warning(&format!(
                "Cannot create log file {}: {}. Logging to console only",
                path.display(),
                e
            ));
            None
        }
    });

    // A subscriber may already be set (tests, embedding); keep it.
    let _ = tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init();

    opened
}
