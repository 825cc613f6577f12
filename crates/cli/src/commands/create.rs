//! `polyreg create`: Create an instance through a type's factory.

use std::path::Path;

use polyreg_registry::CreationContext;

pub fn run(
    manifest: Option<&Path>,
    type_name: &str,
    name: &str,
    parent: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_, registry) = super::load(manifest)?;
    let mut ctx = CreationContext::under(parent);
    let instance = registry.create(type_name, &mut ctx, name)?;
    println!("{}", serde_json::to_string_pretty(&instance)?);
    Ok(())
}
