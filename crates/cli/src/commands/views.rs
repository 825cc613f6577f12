//! `polyreg views`: List the internal views attached to a type.

use std::path::Path;

pub fn run(manifest: Option<&Path>, type_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (_, registry) = super::load(manifest)?;
    let views = registry.internal_views(type_name);

    if views.is_empty() {
        println!("No internal views registered for {type_name}.");
        return Ok(());
    }

    println!("Internal views of {type_name}:");
    for view in &views {
        println!("  - {view}");
    }
    Ok(())
}
