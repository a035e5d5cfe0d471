//! Cluster components.
//!
//! A component owns a configuration schema, decodes HCL configuration into
//! it and renders its embedded chart into manifests. Components are
//! resolved by name through a [`ComponentRegistry`].

pub mod dex;
pub mod flatcar_linux_update_operator;
pub mod gangway;
pub mod registry;

use std::collections::BTreeMap;

use hcl::Body;
use hcl::eval::Context;
use serde::Serialize;

pub use registry::{ComponentFactory, ComponentRegistry};

use crate::chart::{self, RenderedManifests};
use crate::decode::Diagnostics;
use crate::error::Result;

/// Default cert-manager cluster issuer for components exposing an ingress.
pub const DEFAULT_CLUSTER_ISSUER: &str = "letsencrypt-production";

/// A deployable cluster component.
pub trait Component: Send + Sync {
    /// Decode configuration into the component.
    ///
    /// `body` is `None` when the component has no configuration block at all.
    /// Problems are accumulated into the returned diagnostics; check
    /// [`Diagnostics::has_errors`] before rendering.
    fn load_config(&mut self, body: Option<&Body>, ctx: Option<&Context<'_>>) -> Diagnostics;

    /// Render the component's chart with the loaded configuration.
    fn render_manifests(&self) -> Result<RenderedManifests>;

    /// Name and target namespace. Does not require loaded configuration.
    fn metadata(&self) -> Metadata;
}

/// Static information about a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub name: String,
    pub namespace: Namespace,
}

/// Namespace a component is installed into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Namespace {
    pub name: String,
    pub labels: BTreeMap<String, String>,
}

impl Namespace {
    /// A namespace labelled with its own name, so network policies can
    /// select it.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut labels = BTreeMap::new();
        labels.insert("name".to_string(), name.clone());
        Self { name, labels }
    }
}

impl Metadata {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Namespace::new(namespace),
        }
    }
}

/// Load the chart named after the component and render it as a release of
/// the same name into the component's namespace.
pub(crate) fn render_component_chart(
    metadata: &Metadata,
    values_overlay: &str,
) -> Result<RenderedManifests> {
    let chart = chart::load_chart(&metadata.name)?;
    let manifests = chart::render_chart(
        &chart,
        &metadata.name,
        &metadata.namespace.name,
        values_overlay,
    )?;
    Ok(manifests)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_labels() {
        let metadata = Metadata::new("dex", "dex");
        assert_eq!(metadata.namespace.name, "dex");
        assert_eq!(
            metadata.namespace.labels.get("name").map(String::as_str),
            Some("dex")
        );
    }

    #[test]
    fn test_render_component_chart_unknown_chart() {
        let metadata = Metadata::new("missing", "default");
        let err = render_component_chart(&metadata, "").unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Asset(crate::error::AssetError::ChartNotFound(_))
        ));
    }
}
