//! `polyreg resolve`: Show where a type gets its default implementation.

use std::path::Path;

pub fn run(manifest: Option<&Path>, type_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (_, registry) = super::load(manifest)?;
    let info = registry.implementation_info(type_name)?;

    println!("{type_name}");
    println!("  implementation: {}", info.implementation);
    if info.owner.as_str() == type_name {
        println!("  registered on:  {type_name} (own registration)");
    } else {
        println!("  registered on:  {} (inherited)", info.owner);
    }
    Ok(())
}
