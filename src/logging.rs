use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

use std::path::PathBuf;

use crate::config::AppConfig;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Send diagnostics to `<data_dir>/clickboard.log`.
///
/// The terminal belongs to the UI, so nothing is printed to stdout. The
/// level follows `RUST_LOG` and defaults to `info`.
pub fn init(config: &AppConfig) -> anyhow::Result<()> {
    fs::create_dir_all(config.data_dir())
        .with_context(|| format!("creating {}", config.data_dir().display()))?;

    let path = log_path(config);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("installing log subscriber")
}

pub fn log_path(config: &AppConfig) -> PathBuf {
    config.log_path()
}
