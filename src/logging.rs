//! Logging setup.
//!
//! The terminal belongs to the UI, so `tracing` output goes to a log file
//! under the user's state directory. The filter comes from
//! `TIMER_DASHBOARD_LOG` and defaults to `info`:
//!
//! ```bash
//! TIMER_DASHBOARD_LOG=debug timer-dashboard --skip-build
//! ```

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_ENV: &str = "TIMER_DASHBOARD_LOG";
const APP_DIR: &str = "timer-dashboard";
const LOG_FILE: &str = "timer-dashboard.log";

pub fn log_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

/// Installs the global subscriber. Returns the log file path.
pub fn init() -> Result<PathBuf> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir).wrap_err_with(|| format!("creating log dir {dir:?}"))?;

    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .wrap_err_with(|| format!("opening log file {path:?}"))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| eyre!("failed to install tracing subscriber: {e}"))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_filter_parses_common_directives() {
        for d in ["info", "debug", "warn", "timer_dashboard=trace,warn"] {
            assert!(EnvFilter::try_new(d).is_ok(), "failed to parse {d}");
        }
    }

    #[test]
    fn log_dir_is_app_specific() {
        assert!(log_dir().ends_with(APP_DIR));
    }
}
