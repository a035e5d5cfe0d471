//! Chart renderer using Tera.
//!
//! Templates see three variables, mirroring what Helm charts expect:
//! `Release` (`Name`, `Namespace`, `Service`), `Chart`
//! (`Name`, `Version`, `AppVersion`) and `Values` (chart defaults merged
//! with the overlay). A few Helm-style filters are registered on top of
//! Tera's builtins.

use std::collections::{BTreeMap, HashMap};

use base64::Engine;
use serde::Serialize;
use tera::{Context, Tera, Value};

use super::Chart;
use super::values::{merge_values, parse_values};
use crate::error::RenderError;

/// Rendered manifests keyed by chart-relative path
/// (e.g. `dex/templates/deployment.yaml`).
pub type RenderedManifests = BTreeMap<String, String>;

const SERVICE_NAME: &str = "addonctl";
const NOTES_FILE: &str = "NOTES.txt";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ReleaseInfo<'a> {
    name: &'a str,
    namespace: &'a str,
    service: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ChartInfo<'a> {
    name: &'a str,
    version: &'a str,
    app_version: &'a str,
}

/// Render `chart` as release `release_name` into `namespace`.
///
/// `values_overlay` is a YAML document merged over the chart's default
/// values; an empty overlay renders with the defaults.
pub fn render_chart(
    chart: &Chart,
    release_name: &str,
    namespace: &str,
    values_overlay: &str,
) -> Result<RenderedManifests, RenderError> {
    let overlay = parse_values(values_overlay).map_err(|e| RenderError::Values(e.to_string()))?;
    let values = merge_values(chart.values.clone(), overlay);

    let tera = build_tera(chart)?;

    let mut context = Context::new();
    context.insert(
        "Release",
        &ReleaseInfo {
            name: release_name,
            namespace,
            service: SERVICE_NAME,
        },
    );
    context.insert(
        "Chart",
        &ChartInfo {
            name: chart.name(),
            version: &chart.metadata.version,
            app_version: chart.metadata.app_version.as_deref().unwrap_or_default(),
        },
    );
    // Context::insert panics on serialization failure, so convert up front.
    let values = serde_json::to_value(&values).map_err(|e| RenderError::Values(e.to_string()))?;
    context.insert("Values", &values);

    let mut manifests = RenderedManifests::new();
    for path in chart.templates.keys() {
        if !is_rendered(path) {
            continue;
        }

        let name = template_name(chart.name(), path);
        let rendered = tera
            .render(&name, &context)
            .map_err(|e| template_error(&name, &e))?;

        if rendered.trim().is_empty() {
            log::debug!("Template {} rendered empty output, skipping", name);
            continue;
        }

        log::debug!("Rendered template {} ({} bytes)", name, rendered.len());
        manifests.insert(name, rendered);
    }

    if manifests.is_empty() {
        log::warn!("Chart {} rendered no manifests", chart.name());
        return Err(RenderError::NoManifests(chart.name().to_string()));
    }

    log::info!(
        "Rendered {} manifests from chart {} (release {}, namespace {})",
        manifests.len(),
        chart.name(),
        release_name,
        namespace
    );

    Ok(manifests)
}

fn build_tera(chart: &Chart) -> Result<Tera, RenderError> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.register_filter("checksum", checksum_filter);
    tera.register_filter("toyaml", toyaml_filter);
    tera.register_filter("nindent", nindent_filter);
    tera.register_filter("quote", quote_filter);
    tera.register_filter("b64enc", b64enc_filter);

    // All at once, so imports between templates resolve.
    let templates: Vec<(String, &str)> = chart
        .templates
        .iter()
        .map(|(path, content)| (template_name(chart.name(), path), content.as_str()))
        .collect();

    tera.add_raw_templates(templates).map_err(|e| RenderError::Template {
        template: chart.name().to_string(),
        message: error_chain(&e),
    })?;

    Ok(tera)
}

fn template_name(chart: &str, path: &str) -> String {
    format!("{}/{}", chart, path)
}

/// Partials (`_helpers.tpl`) and `NOTES.txt` are never emitted.
fn is_rendered(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    !file_name.starts_with('_') && file_name != NOTES_FILE
}

fn template_error(template: &str, err: &tera::Error) -> RenderError {
    RenderError::Template {
        template: template.to_string(),
        message: error_chain(err),
    }
}

/// Tera nests the useful message in the source chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn as_text(value: &Value) -> tera::Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => serde_json::to_string(other).map_err(tera::Error::json),
    }
}

/// BLAKE3 hex digest of the value.
fn checksum_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = as_text(value)?;
    Ok(Value::String(blake3::hash(text.as_bytes()).to_hex().to_string()))
}

/// YAML serialization of the value, without the trailing newline.
fn toyaml_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let yaml = serde_yaml::to_string(value)
        .map_err(|e| tera::Error::msg(format!("toyaml: {}", e)))?;
    Ok(Value::String(yaml.trim_end_matches('\n').to_string()))
}

/// Newline followed by every line indented `width` spaces.
fn nindent_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let width = match args.get("width") {
        Some(width) => width
            .as_u64()
            .ok_or_else(|| tera::Error::msg("nindent: `width` must be a non-negative integer"))?,
        None => return Err(tera::Error::msg("nindent: missing `width` argument")),
    };
    let text = as_text(value)?;
    let pad = " ".repeat(width as usize);

    let mut out = String::with_capacity(text.len() + 1);
    for line in text.lines() {
        out.push('\n');
        if !line.is_empty() {
            out.push_str(&pad);
            out.push_str(line);
        }
    }
    Ok(Value::String(out))
}

/// Double-quoted, escaped string.
fn quote_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = as_text(value)?;
    let quoted = serde_json::to_string(&text).map_err(tera::Error::json)?;
    Ok(Value::String(quoted))
}

fn b64enc_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = as_text(value)?;
    Ok(Value::String(
        base64::engine::general_purpose::STANDARD.encode(text.as_bytes()),
    ))
}
