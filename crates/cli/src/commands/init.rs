//! `polyreg init`: Write a starter manifest.

use std::path::Path;

use polyreg_config::Manifest;

pub fn run(manifest: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Manifest::resolve_path(manifest);

    if path.exists() && !force {
        println!("  Manifest already exists: {}", path.display());
        println!("  Use --force to overwrite it.");
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, Manifest::default_toml())?;

    println!("✅ Wrote starter manifest: {}", path.display());
    println!("\nNext steps:");
    println!("  polyreg check          # validate the registrations");
    println!("  polyreg types          # see how each public type resolves");
    Ok(())
}
