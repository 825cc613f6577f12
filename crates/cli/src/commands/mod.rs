pub mod check;
pub mod create;
pub mod init;
pub mod manifest_cmd;
pub mod resolve;
pub mod types;
pub mod views;

use std::path::Path;

use polyreg_config::Manifest;
use polyreg_registry::{ManifestRegistry, load_registry};
use tracing::debug;

/// Load the manifest the user pointed at and build its registry.
pub(crate) fn load(
    manifest: Option<&Path>,
) -> Result<(Manifest, ManifestRegistry), Box<dyn std::error::Error>> {
    let path = Manifest::resolve_path(manifest);
    debug!(path = %path.display(), "Loading manifest");
    Ok(load_registry(&path)?)
}
