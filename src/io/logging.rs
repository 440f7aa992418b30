use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`info` when unset)
pub const LOG_ENV: &str = "WRC_LOG";

/// Log file inside the state directory
pub fn log_path(state_dir: &Path) -> PathBuf {
    state_dir.join("wrc.log")
}

/// Send tracing output to `<state_dir>/wrc.log`. The terminal belongs to
/// the TUI, so nothing is written to stderr.
pub fn init_file_logging(state_dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(state_dir)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path(state_dir))?;

    // A subscriber may already be installed (e.g. when embedded in tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| "info".into()))
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .try_init();

    Ok(())
}

/// Log warnings and errors to stderr for one-shot CLI commands.
pub fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| "warn".into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
