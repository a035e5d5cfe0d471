use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;

use super::utils::{load_component, load_workspace, print_diagnostics};
use crate::chart::RenderedManifests;
use crate::components::ComponentRegistry;
use crate::config::types::Config;

pub fn handle_render(
    registry: &ComponentRegistry,
    config: &Config,
    path: PathBuf,
    components: Vec<String>,
    vars: Option<PathBuf>,
    output: Option<PathBuf>,
    quiet: bool,
) -> crate::Result<()> {
    let workspace = load_workspace(&path, vars, config)?;
    print_diagnostics(&workspace.diagnostics);
    if workspace.diagnostics.has_errors() {
        return Err(crate::Error::ValidationFailed(1));
    }

    // Decode everything before rendering anything.
    let mut loaded = Vec::with_capacity(components.len());
    let mut failed = 0;
    for name in &components {
        let (component, diagnostics) = load_component(registry, &workspace, name)?;
        print_diagnostics(&diagnostics);
        if diagnostics.has_errors() {
            failed += 1;
        }
        loaded.push(component);
    }
    if failed > 0 {
        return Err(crate::Error::ValidationFailed(failed));
    }

    let output_dir = output.or_else(|| config.render.output_dir.clone());
    for component in &loaded {
        let manifests = component.render_manifests()?;
        match &output_dir {
            Some(dir) => {
                write_manifests(dir, &manifests)?;
                if !quiet {
                    eprintln!(
                        "{} {} ({} manifests) -> {}",
                        "✓".green(),
                        component.metadata().name,
                        manifests.len(),
                        dir.display()
                    );
                }
            }
            None => print!("{}", format_manifests(&manifests)),
        }
    }
    Ok(())
}

/// Manifests as one multi-document YAML stream with `# Source:` headers.
pub fn format_manifests(manifests: &RenderedManifests) -> String {
    let mut out = String::new();
    for (path, content) in manifests {
        out.push_str("---\n# Source: ");
        out.push_str(path);
        out.push('\n');
        out.push_str(content);
        if !content.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Write each manifest to `dir/<path>`, creating parent directories.
pub fn write_manifests(dir: &Path, manifests: &RenderedManifests) -> crate::Result<()> {
    for (path, content) in manifests {
        let target = dir.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, content)?;
        log::info!("Wrote {}", target.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manifests() -> RenderedManifests {
        let mut manifests = RenderedManifests::new();
        manifests.insert("demo/templates/b.yaml".to_string(), "kind: B".to_string());
        manifests.insert("demo/templates/a.yaml".to_string(), "kind: A\n".to_string());
        manifests
    }

    #[test]
    fn test_format_manifests() {
        assert_eq!(
            format_manifests(&manifests()),
            "---\n# Source: demo/templates/a.yaml\nkind: A\n---\n# Source: demo/templates/b.yaml\nkind: B\n"
        );
    }

    #[test]
    fn test_write_manifests() {
        let dir = TempDir::new().unwrap();
        write_manifests(dir.path(), &manifests()).unwrap();
        let written = fs::read_to_string(dir.path().join("demo/templates/a.yaml")).unwrap();
        assert_eq!(written, "kind: A\n");
        assert!(dir.path().join("demo/templates/b.yaml").exists());
    }
}
