use std::path::{Path, PathBuf};

use colored::Colorize;
use hcl::Body;
use hcl::eval::Context;

use crate::components::{Component, ComponentRegistry};
use crate::config::types::Config;
use crate::decode::{
    Diagnostics, Severity, component_body, eval_context, load_documents, parse_document,
};

/// Parsed configuration documents plus the variables they are evaluated with.
pub struct Workspace {
    pub document: Body,
    pub context: Context<'static>,
    /// Problems found while resolving variables
    pub diagnostics: Diagnostics,
}

/// Load the documents at `path` and resolve variables.
///
/// `vars` (the CLI flag) takes precedence over the configured vars file.
pub fn load_workspace(path: &Path, vars: Option<PathBuf>, config: &Config) -> crate::Result<Workspace> {
    let document = load_documents(path, &config.render.config_glob_extension)?;

    let vars_file = vars.or_else(|| config.render.vars_file.clone());
    let values = match vars_file {
        Some(file) => {
            log::debug!("Loading variables from {}", file.display());
            let content = std::fs::read_to_string(&file)?;
            Some(parse_document(&content)?)
        }
        None => None,
    };

    let (context, diagnostics) = eval_context(&document, values.as_ref());
    Ok(Workspace {
        document,
        context,
        diagnostics,
    })
}

/// Create the component called `name` and load its configuration.
pub fn load_component(
    registry: &ComponentRegistry,
    workspace: &Workspace,
    name: &str,
) -> crate::Result<(Box<dyn Component>, Diagnostics)> {
    let mut component = registry.create(name)?;
    let diagnostics = match component_body(&workspace.document, name) {
        Ok(body) => component.load_config(body.as_ref(), Some(&workspace.context)),
        Err(diagnostics) => diagnostics,
    };
    Ok((component, diagnostics))
}

/// Print diagnostics to stderr, one per line.
pub fn print_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics {
        let severity = match diagnostic.severity {
            Severity::Error => diagnostic.severity.as_str().red().bold(),
            Severity::Warning => diagnostic.severity.as_str().yellow().bold(),
        };
        let subject = diagnostic
            .subject
            .as_deref()
            .map(|s| format!(" ({})", s).dimmed().to_string())
            .unwrap_or_default();
        eprintln!(
            "{}: {}{}",
            severity,
            diagnostic.summary.bold(),
            subject
        );
        if !diagnostic.detail.is_empty() {
            eprintln!("  {}", diagnostic.detail);
        }
    }
}
