//! # Cluster addons
//!
//! Cluster components (an identity broker, a login gateway, a reboot
//! coordinator, ...) declared as HCL configuration and rendered into
//! Kubernetes manifests from charts embedded in the binary.
//!
//! Each component decodes its `component "<name>" { ... }` block against a
//! closed schema, reporting every problem as [`decode::Diagnostics`], and then
//! renders its chart deterministically: the same configuration always yields
//! byte-identical manifests.
//!
//! ## Example
//!
//! ```rust,no_run
//! use cluster_addons::components::ComponentRegistry;
//! use cluster_addons::decode::get_component_body;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let src = r#"component "flatcar-linux-update-operator" {}"#;
//! let registry = ComponentRegistry::with_builtin_components()?;
//!
//! let mut component = registry.create("flatcar-linux-update-operator")?;
//! let body = get_component_body(src, "flatcar-linux-update-operator")?;
//! let diagnostics = component.load_config(body.as_ref(), None);
//! assert!(!diagnostics.has_errors());
//!
//! for (path, manifest) in component.render_manifests()? {
//!     println!("# {}\n{}", path, manifest);
//! }
//! # Ok(())
//! # }
//! ```

pub mod chart;
pub mod cli;
pub mod components;
pub mod config;
pub mod decode;
pub mod error;
pub mod handlers;

// Re-export commonly used types and functions
pub use chart::RenderedManifests;
pub use components::{Component, ComponentRegistry, Metadata};
pub use decode::{Diagnostic, Diagnostics};
pub use error::{Error, Result};

use cli::Commands;
use config::types::Config;

pub fn run_command(command: Commands, config: &Config, quiet: bool) -> Result<()> {
    let registry = ComponentRegistry::with_builtin_components()?;
    match command {
        Commands::List { json } => handlers::handle_list(&registry, json),
        Commands::Validate {
            path,
            components,
            vars,
        } => handlers::handle_validate(&registry, config, path, components, vars, quiet),
        Commands::Render {
            path,
            components,
            vars,
            output,
        } => handlers::handle_render(&registry, config, path, components, vars, output, quiet),
    }
}
