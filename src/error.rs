//! Error types for the component layer.
//!
//! Configuration problems are not errors: they are reported as
//! [`Diagnostics`](crate::decode::Diagnostics). The types here cover the
//! fatal paths (missing chart assets, template failures, registry misuse,
//! tool configuration and I/O).

use thiserror::Error;

use crate::decode::Diagnostics;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Embedded chart could not be loaded
    #[error("loading chart from assets: {0}")]
    Asset(#[from] AssetError),

    /// Chart rendering failed
    #[error("rendering chart: {0}")]
    Render(#[from] RenderError),

    /// Component registry misuse
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Tool configuration problem
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Configuration documents failed to parse or decode
    #[error("invalid configuration:\n{0}")]
    Diagnostics(Diagnostics),

    /// Some components reported configuration errors
    #[error("{0} component(s) failed validation")]
    ValidationFailed(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<Diagnostics> for Error {
    fn from(diagnostics: Diagnostics) -> Self {
        Self::Diagnostics(diagnostics)
    }
}

/// Errors raised while loading an embedded chart.
///
/// These indicate a packaging defect, never a user configuration problem.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("chart {0:?} is not embedded in this build")]
    ChartNotFound(String),

    #[error("chart {0:?} has no Chart.yaml")]
    MissingChartFile(String),

    #[error("chart {chart:?}: invalid {file}: {message}")]
    Invalid {
        chart: String,
        file: String,
        message: String,
    },
}

/// Errors raised while rendering a chart.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A template failed to parse or execute
    #[error("template {template}: {message}")]
    Template { template: String, message: String },

    /// The values overlay is not a valid YAML mapping
    #[error("parsing values overlay: {0}")]
    Values(String),

    /// Component values could not be serialized into an overlay
    #[error("serializing values overlay: {0}")]
    Serialize(#[from] serde_yaml::Error),

    /// Every template rendered to empty output
    #[error("chart {0:?} rendered no manifests")]
    NoManifests(String),
}

/// Errors raised by the component registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("component {0:?} is already registered")]
    AlreadyRegistered(String),

    #[error("component {0:?} is not registered")]
    NotFound(String),
}

/// Errors raised while loading the tool configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse {path}: {message}")]
    ParsingFailed { path: String, message: String },

    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("no configuration files found in {0}")]
    NoDocuments(String),

    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Result type alias using the crate error.
pub type Result<T> = std::result::Result<T, Error>;
