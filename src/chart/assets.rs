//! Embedded chart assets, compiled into the binary.
//!
//! Each chart is a list of (chart-relative path, content) pairs loaded with
//! `include_str!`, so rendering works without any files on disk.

use super::Chart;
use crate::error::AssetError;

/// A chart bundled into the binary.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedChart {
    pub name: &'static str,
    pub files: &'static [(&'static str, &'static str)],
}

macro_rules! chart_file {
    ($chart:literal, $path:literal) => {
        (
            $path,
            include_str!(concat!("../../assets/charts/components/", $chart, "/", $path)),
        )
    };
}

const DEX: &[(&str, &str)] = &[
    chart_file!("dex", "Chart.yaml"),
    chart_file!("dex", "values.yaml"),
    chart_file!("dex", "templates/_helpers.tpl"),
    chart_file!("dex", "templates/NOTES.txt"),
    chart_file!("dex", "templates/deployment.yaml"),
    chart_file!("dex", "templates/ingress.yaml"),
    chart_file!("dex", "templates/rbac.yaml"),
    chart_file!("dex", "templates/secret.yaml"),
    chart_file!("dex", "templates/service.yaml"),
    chart_file!("dex", "templates/serviceaccount.yaml"),
];

const GANGWAY: &[(&str, &str)] = &[
    chart_file!("gangway", "Chart.yaml"),
    chart_file!("gangway", "values.yaml"),
    chart_file!("gangway", "templates/_helpers.tpl"),
    chart_file!("gangway", "templates/configmap.yaml"),
    chart_file!("gangway", "templates/deployment.yaml"),
    chart_file!("gangway", "templates/ingress.yaml"),
    chart_file!("gangway", "templates/secret.yaml"),
    chart_file!("gangway", "templates/service.yaml"),
];

const FLATCAR_LINUX_UPDATE_OPERATOR: &[(&str, &str)] = &[
    chart_file!("flatcar-linux-update-operator", "Chart.yaml"),
    chart_file!("flatcar-linux-update-operator", "values.yaml"),
    chart_file!("flatcar-linux-update-operator", "templates/_helpers.tpl"),
    chart_file!("flatcar-linux-update-operator", "templates/agent-rbac.yaml"),
    chart_file!("flatcar-linux-update-operator", "templates/operator-rbac.yaml"),
    chart_file!("flatcar-linux-update-operator", "templates/update-agent.yaml"),
    chart_file!("flatcar-linux-update-operator", "templates/update-operator.yaml"),
];

/// All charts embedded in this build.
pub const ALL_CHARTS: &[EmbeddedChart] = &[
    EmbeddedChart {
        name: "dex",
        files: DEX,
    },
    EmbeddedChart {
        name: "flatcar-linux-update-operator",
        files: FLATCAR_LINUX_UPDATE_OPERATOR,
    },
    EmbeddedChart {
        name: "gangway",
        files: GANGWAY,
    },
];

/// Load and parse the embedded chart called `name`.
pub fn load_chart(name: &str) -> Result<Chart, AssetError> {
    let embedded = ALL_CHARTS
        .iter()
        .find(|c| c.name == name)
        .ok_or_else(|| AssetError::ChartNotFound(name.to_string()))?;

    log::debug!(
        "Loading embedded chart {} ({} files)",
        embedded.name,
        embedded.files.len()
    );

    Chart::from_files(embedded.name, embedded.files.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_embedded_chart_loads() {
        for embedded in ALL_CHARTS {
            let name = embedded.name;
            let chart = load_chart(name).unwrap();
            assert_eq!(chart.name(), name);
            assert!(!chart.templates.is_empty(), "{} has no templates", name);
        }
    }

    #[test]
    fn test_missing_chart() {
        let err = load_chart("does-not-exist").unwrap_err();
        assert!(matches!(err, AssetError::ChartNotFound(ref n) if n == "does-not-exist"));
    }
}
