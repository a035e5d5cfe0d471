//! Packaged charts and their rendering.
//!
//! A chart is a `Chart.yaml`, an optional `values.yaml` with defaults, and a
//! set of Tera templates under `templates/`. Charts are embedded in the binary
//! (see [`assets`]) and rendered into manifests with [`render_chart`].

pub mod assets;
pub mod metadata;
pub mod render;
pub mod values;

use std::collections::BTreeMap;

pub use assets::load_chart;
pub use metadata::{ChartMetadata, parse_chart_yaml};
pub use render::{RenderedManifests, render_chart};

use crate::error::AssetError;

const CHART_FILE: &str = "Chart.yaml";
const VALUES_FILE: &str = "values.yaml";
const TEMPLATES_DIR: &str = "templates/";

/// A loaded chart.
#[derive(Debug, Clone)]
pub struct Chart {
    pub metadata: ChartMetadata,
    /// Default values from `values.yaml`.
    pub values: serde_yaml::Value,
    /// Template sources keyed by chart-relative path (`templates/...`).
    pub templates: BTreeMap<String, String>,
}

impl Chart {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Build a chart from (chart-relative path, content) pairs.
    ///
    /// `name` is the name the chart was looked up by; it must match the
    /// name declared in `Chart.yaml`.
    pub fn from_files<'a, I>(name: &str, files: I) -> Result<Self, AssetError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let invalid = |file: &str, message: String| AssetError::Invalid {
            chart: name.to_string(),
            file: file.to_string(),
            message,
        };

        let mut metadata = None;
        let mut values = None;
        let mut templates = BTreeMap::new();

        for (path, content) in files {
            if path == CHART_FILE {
                let parsed =
                    parse_chart_yaml(content).map_err(|e| invalid(CHART_FILE, e.to_string()))?;
                metadata = Some(parsed);
            } else if path == VALUES_FILE {
                let parsed = values::parse_values(content)
                    .map_err(|e| invalid(VALUES_FILE, e.to_string()))?;
                values = Some(parsed);
            } else if path.starts_with(TEMPLATES_DIR) {
                templates.insert(path.to_string(), content.to_string());
            }
        }

        let metadata = metadata.ok_or_else(|| AssetError::MissingChartFile(name.to_string()))?;
        if metadata.name != name {
            return Err(invalid(
                CHART_FILE,
                format!("declares name {:?}", metadata.name),
            ));
        }

        Ok(Self {
            metadata,
            values: values.unwrap_or_else(|| serde_yaml::Value::Mapping(serde_yaml::Mapping::new())),
            templates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART_YAML: &str = "apiVersion: v2\nname: demo\nversion: 0.1.0\n";

    #[test]
    fn test_from_files() {
        let chart = Chart::from_files(
            "demo",
            [
                ("Chart.yaml", CHART_YAML),
                ("values.yaml", "replicaCount: 2\n"),
                ("templates/cm.yaml", "kind: ConfigMap\n"),
                ("README.md", "ignored"),
            ],
        )
        .unwrap();

        assert_eq!(chart.name(), "demo");
        assert_eq!(chart.templates.len(), 1);
        assert!(chart.templates.contains_key("templates/cm.yaml"));
        assert_eq!(
            values::get(&chart.values, "replicaCount"),
            Some(&serde_yaml::Value::Number(2.into()))
        );
    }

    #[test]
    fn test_values_default_to_empty() {
        let chart = Chart::from_files("demo", [("Chart.yaml", CHART_YAML)]).unwrap();
        assert!(chart.values.as_mapping().unwrap().is_empty());
    }

    #[test]
    fn test_missing_chart_yaml() {
        let err = Chart::from_files("demo", [("values.yaml", "")]).unwrap_err();
        assert!(matches!(err, AssetError::MissingChartFile(_)));
    }

    #[test]
    fn test_name_mismatch() {
        let err = Chart::from_files("other", [("Chart.yaml", CHART_YAML)]).unwrap_err();
        assert!(matches!(err, AssetError::Invalid { .. }));
    }

    #[test]
    fn test_invalid_values() {
        let err = Chart::from_files(
            "demo",
            [("Chart.yaml", CHART_YAML), ("values.yaml", "- not\n- a mapping\n")],
        )
        .unwrap_err();
        assert!(matches!(err, AssetError::Invalid { ref file, .. } if file == "values.yaml"));
    }
}
