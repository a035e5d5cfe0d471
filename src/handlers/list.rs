use colored::Colorize;

use crate::components::{ComponentRegistry, Metadata};

pub fn handle_list(registry: &ComponentRegistry, json: bool) -> crate::Result<()> {
    let components: Vec<Metadata> = registry
        .names()
        .into_iter()
        .filter_map(|name| registry.create(name).ok())
        .map(|component| component.metadata())
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&components)?);
        return Ok(());
    }

    let width = components.iter().map(|m| m.name.len()).max().unwrap_or(0);
    let width = width.max("COMPONENT".len());
    println!(
        "{}  {}",
        format!("{:<width$}", "COMPONENT").bold(),
        "NAMESPACE".bold()
    );
    for metadata in &components {
        println!(
            "{}  {}",
            format!("{:<width$}", metadata.name).cyan(),
            metadata.namespace.name
        );
    }
    Ok(())
}
