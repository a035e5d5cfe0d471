use std::path::PathBuf;

use colored::Colorize;

use super::utils::{load_component, load_workspace, print_diagnostics};
use crate::components::ComponentRegistry;
use crate::config::types::Config;
use crate::decode::{Diagnostic, Diagnostics, component_names, component_subject};

pub fn handle_validate(
    registry: &ComponentRegistry,
    config: &Config,
    path: PathBuf,
    components: Vec<String>,
    vars: Option<PathBuf>,
    quiet: bool,
) -> crate::Result<()> {
    let workspace = load_workspace(&path, vars, config)?;
    print_diagnostics(&workspace.diagnostics);

    let names = if components.is_empty() {
        component_names(&workspace.document)
    } else {
        components
    };

    if names.is_empty() && !quiet {
        eprintln!("{} no components configured in {}", "warning:".yellow().bold(), path.display());
    }

    let mut failed = usize::from(workspace.diagnostics.has_errors());
    for name in &names {
        let diagnostics = match load_component(registry, &workspace, name) {
            Ok((_, diagnostics)) => diagnostics,
            // Keep going so every other component still gets reported.
            Err(crate::Error::Registry(err)) => Diagnostics::from(
                Diagnostic::error("Unsupported component", err.to_string())
                    .with_subject(component_subject(name)),
            ),
            Err(err) => return Err(err),
        };
        print_diagnostics(&diagnostics);

        if diagnostics.has_errors() {
            failed += 1;
            if !quiet {
                eprintln!("{} {}", "✗".red(), name);
            }
        } else if !quiet {
            eprintln!("{} {}", "✓".green(), name);
        }
    }

    if failed > 0 {
        return Err(crate::Error::ValidationFailed(failed));
    }
    Ok(())
}
