//! Templates command - list registered insurers.

use console::style;

use rcadb_core::extractor::vendors::BUILTIN;
use rcadb_core::extractor::manifest::Layout;
use rcadb_core::Registry;

pub fn run() -> anyhow::Result<()> {
    let registry = Registry::builtin()?;

    println!("{}", style("Registered templates (dispatch order):").bold());
    for (position, name) in registry.names().into_iter().enumerate() {
        let kind = BUILTIN
            .iter()
            .find(|m| m.short_name == name)
            .map(|m| match m.layout {
                Layout::Text(_) => "text",
                Layout::Raster(_) => "raster",
            })
            .unwrap_or("custom");
        println!("  {}. {:<10} {}", position + 1, name, style(kind).dim());
    }

    Ok(())
}
