//! Environment-driven configuration and logging setup shared by both TUIs

use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

/// Read a string variable, falling back when unset or blank
pub fn env_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read a positive millisecond duration such as `METALS_POLL_MS=2000`
pub fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key).ok().and_then(|raw| parse_millis(&raw))
}

fn parse_millis(raw: &str) -> Option<Duration> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

/// Initialize logging
///
/// The TUI owns the terminal, so events go to `METALS_LOG_FILE` (default
/// `default_file`) filtered by `METALS_LOG` (default `info`).
pub fn init_logging(default_file: &str) -> std::io::Result<()> {
    let path = env_string("METALS_LOG_FILE", default_file);
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("METALS_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();

    Ok(())
}
