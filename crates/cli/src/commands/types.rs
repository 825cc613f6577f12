//! `polyreg types`: List public types and how each resolves.

use std::path::Path;

pub fn run(manifest: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let (_, registry) = super::load(manifest)?;
    let types = registry.supported_types();

    if types.is_empty() {
        println!("No public types registered for {}.", registry.display_name());
        return Ok(());
    }

    println!(
        "Public types of {} ({} registered, root: {}):\n",
        registry.display_name(),
        types.len(),
        registry.base_interface()
    );
    let width = types.iter().map(|t| t.as_str().len()).max().unwrap_or(0);
    for ty in &types {
        let factory = if registry.has_factory(ty) { "yes" } else { "no " };
        let resolution = match registry.implementation_info(ty) {
            Ok(info) if info.owner == *ty => info.implementation.to_string(),
            Ok(info) => format!("{} (inherited from {})", info.implementation, info.owner),
            Err(e) => format!("unresolved: {e}"),
        };
        let managed = if registry.graph().is_managed(ty) { " [managed]" } else { "" };
        println!("  {ty:<width$}  factory: {factory}  implementation: {resolution}{managed}");
    }
    Ok(())
}
