//! `polyreg manifest`: Manifest helpers.

use std::path::Path;

use polyreg_config::Manifest;

pub fn path(manifest: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", Manifest::resolve_path(manifest).display());
    Ok(())
}

pub fn show(manifest: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let path = Manifest::resolve_path(manifest);
    let manifest =
        Manifest::load_from(&path).map_err(|e| format!("Failed to load manifest: {e}"))?;
    let toml_str = toml::to_string_pretty(&manifest)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn explicit_manifest_path_is_kept() {
        let path = polyreg_config::Manifest::resolve_path(Some(std::path::Path::new("shapes.toml")));
        assert!(path.to_str().unwrap().ends_with("shapes.toml"));
    }
}
