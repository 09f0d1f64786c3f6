use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::utils::{
    APP_DIR_NAME, BLOB_FILE, DATA_DIR_ENV, EXPORTS_DIR, KEY_FILE, LOG_FILE, PIN_FILE,
    SELECTED_THEME_FILE,
};

// ============================================================================
// APPLICATION CONFIG
// ============================================================================

/// Where all application state lives. Every component is built from this
/// value instead of looking up paths on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Pick the data directory: explicit override, then the environment,
    /// then the platform data directory.
    pub fn resolve(override_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = override_dir {
            return Self::new(dir);
        }
        if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return Self::new(PathBuf::from(dir));
        }
        Self::new(default_data_dir())
    }

    pub fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.data_dir)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn key_path(&self) -> PathBuf {
        self.data_dir.join(KEY_FILE)
    }

    pub fn blob_path(&self) -> PathBuf {
        self.data_dir.join(BLOB_FILE)
    }

    pub fn pin_path(&self) -> PathBuf {
        self.data_dir.join(PIN_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }

    pub fn selected_theme_path(&self) -> PathBuf {
        self.data_dir.join(SELECTED_THEME_FILE)
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir.join(EXPORTS_DIR)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

// ============================================================================
// COMMAND LINE
// ============================================================================

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Run { data_dir: Option<PathBuf> },
    Help,
}

#[derive(Debug, PartialEq, Eq)]
pub struct UsageError(pub String);

pub const USAGE: &str = "Usage: clickboard [--data-dir <path>]\n\n\
Options:\n  \
--data-dir <path>  Directory holding the key, entries, PIN and themes\n  \
-h, --help         Show this message";

pub fn parse_args<I>(args: I) -> Result<Command, UsageError>
where
    I: IntoIterator<Item = String>,
{
    let mut data_dir = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--data-dir" => {
                let value = args
                    .next()
                    .ok_or_else(|| UsageError(String::from("--data-dir needs a path")))?;
                data_dir = Some(PathBuf::from(value));
            }
            other => {
                if let Some(value) = other.strip_prefix("--data-dir=") {
                    data_dir = Some(PathBuf::from(value));
                } else {
                    return Err(UsageError(format!("unknown argument: {}", other)));
                }
            }
        }
    }

    Ok(Command::Run { data_dir })
}
