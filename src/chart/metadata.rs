//! `Chart.yaml` metadata.
//!
//! Only the fields the renderer exposes to templates are read; everything
//! else in the file is ignored.

use serde::Deserialize;
use thiserror::Error;

/// Supported chart API versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ApiVersion {
    #[serde(rename = "v1")]
    V1,
    #[serde(rename = "v2")]
    V2,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    pub api_version: ApiVersion,
    pub name: String,
    pub version: String,
    /// Exposed to templates as `Chart.AppVersion`; empty when unset.
    pub app_version: Option<String>,
}

#[derive(Debug, Error)]
#[error("invalid Chart.yaml: {0}")]
pub struct ChartParseError(#[from] serde_yaml::Error);

pub fn parse_chart_yaml(content: &str) -> Result<ChartMetadata, ChartParseError> {
    Ok(serde_yaml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chart() {
        let yaml = r#"
apiVersion: v2
name: gangway
version: 1.2.3
description: ignored
appVersion: "v3.2.0"
"#;
        let chart = parse_chart_yaml(yaml).unwrap();
        assert_eq!(chart.api_version, ApiVersion::V2);
        assert_eq!(chart.name, "gangway");
        assert_eq!(chart.version, "1.2.3");
        assert_eq!(chart.app_version.as_deref(), Some("v3.2.0"));
    }

    #[test]
    fn test_app_version_is_optional() {
        let chart = parse_chart_yaml("apiVersion: v1\nname: dex\nversion: 0.1.0\n").unwrap();
        assert_eq!(chart.api_version, ApiVersion::V1);
        assert!(chart.app_version.is_none());
    }

    #[test]
    fn test_unknown_api_version_rejected() {
        let err = parse_chart_yaml("apiVersion: v9\nname: weird\nversion: 1.0.0\n").unwrap_err();
        assert!(err.to_string().contains("v9"));
    }

    #[test]
    fn test_missing_version_rejected() {
        assert!(parse_chart_yaml("apiVersion: v2\nname: dex\n").is_err());
        assert!(parse_chart_yaml("invalid: [yaml").is_err());
    }
}
