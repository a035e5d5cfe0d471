//! Top-level configuration documents.
//!
//! A document holds one `component "<name>" { ... }` block per component,
//! optional `variable "<name>" { default = ... }` declarations, and may be
//! split across several `*.lokocfg` files in one directory.

use std::collections::BTreeMap;
use std::path::Path;

use hcl::eval::{Context, Evaluate};
use hcl::{Body, Structure, Value};

use super::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{ConfigError, Result};

/// Block identifier wrapping each component's configuration.
pub const COMPONENT_BLOCK: &str = "component";

/// Block identifier declaring an input variable.
pub const VARIABLE_BLOCK: &str = "variable";

/// Parse HCL text into a body. Syntax errors become a single diagnostic.
pub fn parse_document(src: &str) -> std::result::Result<Body, Diagnostics> {
    hcl::parse(src).map_err(|e| {
        Diagnostics::from(Diagnostic::error(
            "Invalid configuration syntax",
            e.to_string(),
        ))
    })
}

/// Find the body of `component "<name>"` in a parsed document.
///
/// Returns `Ok(None)` when the component is not configured at all.
pub fn component_body(
    document: &Body,
    name: &str,
) -> std::result::Result<Option<Body>, Diagnostics> {
    let mut found = document.blocks().filter(|block| {
        block.identifier() == COMPONENT_BLOCK
            && block.labels().first().map(|l| l.as_str()) == Some(name)
    });

    let Some(first) = found.next() else {
        return Ok(None);
    };

    let duplicates = found.count();
    if duplicates > 0 {
        return Err(Diagnostic::error(
            "Duplicate component block",
            format!(
                "Component \"{}\" is configured {} times; only one block is allowed.",
                name,
                duplicates + 1
            ),
        )
        .into());
    }

    Ok(Some(first.body().clone()))
}

/// Parse `src` and extract the body for component `name`.
pub fn get_component_body(
    src: &str,
    name: &str,
) -> std::result::Result<Option<Body>, Diagnostics> {
    let document = parse_document(src)?;
    component_body(&document, name)
}

/// Names of all components configured in `document`, in declaration order.
pub fn component_names(document: &Body) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for block in document.blocks() {
        if block.identifier() != COMPONENT_BLOCK {
            continue;
        }
        if let Some(label) = block.labels().first() {
            if !names.iter().any(|n| n == label.as_str()) {
                names.push(label.as_str().to_string());
            }
        }
    }
    names
}

/// Load configuration from a single file or every `*.<extension>` file in a
/// directory, merged into one body in file name order.
pub fn load_documents(path: &Path, extension: &str) -> Result<Body> {
    let files = if path.is_dir() {
        let pattern = path.join(format!("*.{}", extension));
        let mut files = Vec::new();
        for entry in glob::glob(&pattern.to_string_lossy()).map_err(ConfigError::from)? {
            files.push(entry.map_err(|e| e.into_error())?);
        }
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    };

    if files.is_empty() {
        return Err(ConfigError::NoDocuments(path.display().to_string()).into());
    }

    let mut structures: Vec<Structure> = Vec::new();
    let mut diagnostics = Diagnostics::new();
    for file in &files {
        log::debug!("Loading configuration from {}", file.display());
        let content = std::fs::read_to_string(file)?;
        match parse_document(&content) {
            Ok(body) => structures.extend(body),
            Err(diags) => diagnostics.extend(annotate(diags, file)),
        }
    }

    if diagnostics.has_errors() {
        return Err(diagnostics.into());
    }

    Ok(structures.into_iter().collect())
}

fn annotate(diagnostics: Diagnostics, file: &Path) -> Diagnostics {
    diagnostics
        .into_iter()
        .map(|d| d.with_subject(file.display().to_string()))
        .collect()
}

/// Build the evaluation context exposing `var.<name>` to component bodies.
///
/// Declared defaults come from `variable` blocks in `document`; `values`
/// (a variables file of plain `name = value` attributes) overrides them.
/// A declared variable with neither a default nor a value is an error; a
/// value for an undeclared variable is a warning.
pub fn eval_context(document: &Body, values: Option<&Body>) -> (Context<'static>, Diagnostics) {
    let empty = Context::new();
    let mut diagnostics = Diagnostics::new();
    let mut declared: BTreeMap<String, Option<Value>> = BTreeMap::new();

    for block in document.blocks().filter(|b| b.identifier() == VARIABLE_BLOCK) {
        let name = match block.labels() {
            [label] => label.as_str(),
            _ => {
                diagnostics.push(Diagnostic::error(
                    "Invalid variable block",
                    "Variable blocks must have exactly one label, the variable name.",
                ));
                continue;
            }
        };

        let default = block
            .body()
            .attributes()
            .find(|attr| attr.key() == "default")
            .and_then(|attr| match attr.expr().evaluate(&empty) {
                Ok(value) => Some(value),
                Err(err) => {
                    diagnostics.push(
                        Diagnostic::error("Invalid default value", err.to_string())
                            .with_subject(format!("variable \"{}\"", name)),
                    );
                    None
                }
            });

        declared.insert(name.to_string(), default);
    }

    let mut vars = hcl::Map::new();
    if let Some(values) = values {
        for structure in values.iter() {
            match structure {
                Structure::Attribute(attr) => {
                    if !declared.contains_key(attr.key()) {
                        diagnostics.push(Diagnostic::warning(
                            "Value for undeclared variable",
                            format!(
                                "A variable named \"{}\" was assigned a value, but no variable block declares it.",
                                attr.key()
                            ),
                        ));
                    }
                    match attr.expr().evaluate(&empty) {
                        Ok(value) => {
                            vars.insert(attr.key().to_string(), value);
                        }
                        Err(err) => diagnostics.push(
                            Diagnostic::error("Invalid variable value", err.to_string())
                                .with_subject(format!("var.{}", attr.key())),
                        ),
                    }
                }
                Structure::Block(block) => diagnostics.push(Diagnostic::error(
                    "Unexpected block in variables file",
                    format!(
                        "Blocks of type \"{}\" are not allowed; only name = value assignments are.",
                        block.identifier()
                    ),
                )),
            }
        }
    }

    for (name, default) in declared {
        if vars.contains_key(&name) {
            continue;
        }
        match default {
            Some(value) => {
                vars.insert(name, value);
            }
            None => diagnostics.push(Diagnostic::error(
                "Unset variable",
                format!(
                    "Variable \"{}\" has no default and no value was provided.",
                    name
                ),
            )),
        }
    }

    let mut ctx = Context::new();
    ctx.declare_var("var", Value::Object(vars));
    (ctx, diagnostics)
}
