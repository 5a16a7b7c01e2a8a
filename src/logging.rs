use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use anyhow::{Context, Result};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

use crate::persistence;
use crate::state::GeneralSettings;

const LOG_FILE: &str = "translation.log";
const LOG_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Installs the global subscriber writing to the log file, truncated on every
/// start. Returns the path of the file.
pub fn init(general: &GeneralSettings) -> Result<PathBuf> {
    let path = log_path(general)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = File::create(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&general.log_level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_timer(ChronoLocal::new(LOG_DATE_FORMAT.to_string()))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;

    Ok(path)
}

pub fn log_path(general: &GeneralSettings) -> Result<PathBuf> {
    match &general.log_file {
        Some(path) => Ok(path.clone()),
        None => Ok(persistence::data_dir()?.join(LOG_FILE)),
    }
}

/// `RUST_LOG` wins when set. enigo is held to errors so typed text never lands in the log.
fn env_filter(level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(format!("{},enigo=error", normalize_level(level)))
}

fn normalize_level(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}
