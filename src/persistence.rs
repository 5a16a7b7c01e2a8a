use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use crate::state::Settings;

const APP_DIR: &str = "translate-in-place";
const SETTINGS_FILE: &str = "settings.json";
const SETTINGS_PATH_ENV: &str = "TRANSLATE_IN_PLACE_SETTINGS";

/// Where the settings file lives, honouring the override variable.
pub fn settings_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(SETTINGS_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot find the user configuration directory"))?;
    Ok(config_dir.join(APP_DIR).join(SETTINGS_FILE))
}

/// Per-user data directory; the log file goes here unless configured otherwise.
pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot find the local data directory"))?;
    Ok(data_dir.join(APP_DIR))
}

/// Reads settings from `path`. A missing file yields defaults and writes them
/// out so the user has something to edit.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        let settings = Settings::default();
        save_settings(path, &settings)?;
        return Ok(settings);
    }

    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;
    let settings = serde_json::from_str::<Settings>(&data)
        .with_context(|| format!("Failed to parse settings in {}", path.display()))?;
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let data = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, data)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;
    Ok(())
}
