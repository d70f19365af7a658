//! Tracing subscriber setup: console output plus an optional log file.

use std::ffi::OsStr;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Log file used when `LOG_FILE` is not set
pub const DEFAULT_LOG_FILE: &str = "log/bot.log";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    /// Emit JSON lines on the console instead of human readable text
    pub json: bool,
    /// Also append plain log lines to this file
    pub file: Option<PathBuf>,
}

impl LogSettings {
    /// Read `LOG_FORMAT` and `LOG_FILE` from the environment
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("LOG_FORMAT").ok().as_deref(),
            std::env::var_os("LOG_FILE").as_deref(),
        )
    }

    /// An unset `file` means [`DEFAULT_LOG_FILE`]; an empty one disables the file
    pub fn from_values(format: Option<&str>, file: Option<&OsStr>) -> Self {
        Self {
            json: format.is_some_and(|format| format.trim().eq_ignore_ascii_case("json")),
            file: match file {
                None => Some(PathBuf::from(DEFAULT_LOG_FILE)),
                Some(path) if path.is_empty() => None,
                Some(path) => Some(PathBuf::from(path)),
            },
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init(settings: &LogSettings) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file_layer = match &settings.file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    let plain_layer = (!settings.json).then(fmt::layer);
    let json_layer = settings.json.then(|| fmt::layer().json());

    tracing_subscriber::registry()
        .with(filter)
        .with(plain_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
