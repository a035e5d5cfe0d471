use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default extension of configuration documents in a directory.
pub const DEFAULT_CONFIG_EXTENSION: &str = "lokocfg";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
}

/// Render configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Write manifests under this directory instead of stdout
    pub output_dir: Option<PathBuf>,
    /// Variables file providing `var.<name>` values
    pub vars_file: Option<PathBuf>,
    /// Extension matched when the configuration path is a directory
    pub config_glob_extension: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            vars_file: None,
            config_glob_extension: DEFAULT_CONFIG_EXTENSION.to_string(),
        }
    }
}
