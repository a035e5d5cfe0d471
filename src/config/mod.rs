pub mod types;

use crate::error::{ConfigError, Result};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".addonctl.toml";

/// Get the global config file path (~/.addonctl.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (project/.addonctl.toml)
pub fn local_config_path(project_path: &Path) -> PathBuf {
    project_path.join(CONFIG_FILE_NAME)
}

/// Load configuration from `explicit` if given, otherwise the local config,
/// then the global config, then defaults.
pub fn load_config(explicit: Option<&Path>, project_path: Option<&Path>) -> Result<types::Config> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    // Try local config first
    if let Some(path) = project_path {
        let local = local_config_path(path);
        if local.exists() {
            return read_config(&local);
        }
    }

    // Try global config
    if let Some(global) = global_config_path() {
        if global.exists() {
            return read_config(&global);
        }
    }

    log::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
    Ok(types::Config::default())
}

fn read_config(path: &Path) -> Result<types::Config> {
    log::debug!("Loading tool configuration from {}", path.display());
    let content = fs::read_to_string(path).map_err(ConfigError::from)?;
    let config = toml::from_str(&content).map_err(|e| ConfigError::ParsingFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(config)
}
