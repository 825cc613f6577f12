//! Build a registry from a TOML manifest.
//!
//! Manifest-described families have no Rust types behind them, so every
//! factory and constructor produces a [`DeclaredInstance`] that records what
//! was asked for.

use polyreg_config::{ConfigError, Manifest};
use polyreg_core::{RegistryError, Source, TypeName};
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::factory::{Implementation, InstanceFactory};

/// An instance produced for a manifest-described family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredInstance {
    /// Type the instance was created as.
    pub type_name: TypeName,
    /// Instance name; empty for default-constructed instances.
    pub name: String,
    /// Dotted path below the creation context's parent.
    pub path: String,
    /// Default implementation backing the type, when one resolves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<TypeName>,
}

/// Where manifest factories create instances.
#[derive(Debug, Clone, Default)]
pub struct CreationContext {
    /// Path of the parent node; empty for top-level instances.
    pub parent: String,
    /// Paths of every instance created through this context.
    pub created: Vec<String>,
}

impl CreationContext {
    pub fn under(parent: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            created: Vec::new(),
        }
    }

    fn child_path(&self, name: &str) -> String {
        if self.parent.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.parent)
        }
    }
}

pub type ManifestRegistry = InstanceFactory<DeclaredInstance, CreationContext>;

/// Errors from loading a manifest into a registry.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Register everything `manifest` declares.
///
/// All types are declared before any public type is registered, so manifest
/// order never matters for assignability. Factories are registered last so
/// each can record the implementation its type resolves to.
pub fn build_registry(manifest: &Manifest) -> Result<ManifestRegistry, RegistryError> {
    let family = &manifest.family;
    let mut registry = ManifestRegistry::new(family.display_name.as_str(), family.root.as_str());

    for ty in &manifest.types {
        registry.declare_type(ty.to_decl())?;
    }
    for ty in manifest.types.iter().filter(|t| t.public) {
        registry.register_public_type(ty.to_decl())?;
    }

    for imp in &manifest.implementations {
        // Manifest validation guarantees the implementation is declared.
        let Some(ty) = manifest.type_config(&imp.implementation) else {
            continue;
        };
        let implementation = if ty.constructible {
            let type_name = TypeName::new(&ty.name);
            Implementation::constructible(ty.to_decl(), move || DeclaredInstance {
                type_name: type_name.clone(),
                name: String::new(),
                path: String::new(),
                implementation: Some(type_name.clone()),
            })
        } else {
            Implementation::new(ty.to_decl())
        };
        registry.register_implementation(
            imp.type_name.as_str(),
            source(&imp.source),
            implementation,
        )?;
    }

    for view in &manifest.views {
        registry.register_internal_view(
            view.type_name.as_str(),
            source(&view.source),
            view.view.as_str(),
        );
    }

    for factory in &manifest.factories {
        let type_name = TypeName::new(&factory.type_name);
        let implementation = registry
            .implementation_info(&type_name)
            .ok()
            .map(|info| info.implementation);
        let created_as = type_name.clone();
        registry.register_factory(
            type_name,
            source(&factory.source),
            move |name, ctx: &mut CreationContext| {
                let path = ctx.child_path(name);
                ctx.created.push(path.clone());
                DeclaredInstance {
                    type_name: created_as.clone(),
                    name: name.to_string(),
                    path,
                    implementation: implementation.clone(),
                }
            },
        )?;
    }

    info!(
        family = %registry.display_name(),
        public_types = registry.supported_types().len(),
        "Built registry from manifest"
    );
    Ok(registry)
}

/// Load the manifest at `path` and build its registry.
pub fn load_registry(path: &Path) -> Result<(Manifest, ManifestRegistry), LoadError> {
    let manifest = Manifest::load_from(path)?;
    let registry = build_registry(&manifest)?;
    Ok((manifest, registry))
}

fn source(source: &Option<String>) -> Option<Source> {
    source.as_deref().map(Source::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SHAPES: &str = r#"
[family]
display_name = "shape types"
root = "Shape"

[[types]]
name = "Ring"
extends = ["Circle"]
public = true
managed = true

[[types]]
name = "Circle"
extends = ["Shape"]
public = true

[[types]]
name = "DefaultCircle"
extends = ["Circle", "Resizable"]
kind = "concrete"

[[implementations]]
type = "Circle"
implementation = "DefaultCircle"
source = "PluginA"

[[views]]
type = "Circle"
view = "Resizable"
source = "PluginB"

[[factories]]
type = "Circle"
source = "PluginA"

[[factories]]
type = "Ring"
"#;

    #[test]
    fn manifest_order_does_not_matter() {
        let registry = build_registry(&Manifest::from_toml(SHAPES).unwrap()).unwrap();
        let types: Vec<String> = registry
            .supported_types()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(types, vec!["Ring", "Circle"]);
        registry.validate_registrations().unwrap();
    }

    #[test]
    fn factories_record_path_and_implementation() {
        let registry = build_registry(&Manifest::from_toml(SHAPES).unwrap()).unwrap();
        let mut ctx = CreationContext::under("shapes");
        let ring = registry.create("Ring", &mut ctx, "r1").unwrap();
        assert_eq!(ring.type_name.as_str(), "Ring");
        assert_eq!(ring.path, "shapes.r1");
        assert_eq!(ring.implementation, Some(TypeName::new("DefaultCircle")));
        assert_eq!(ctx.created, vec!["shapes.r1".to_string()]);
    }

    #[test]
    fn default_instance_comes_from_constructor() {
        let registry = build_registry(&Manifest::from_toml(SHAPES).unwrap()).unwrap();
        let instance = registry.new_default_instance("Ring").unwrap();
        assert_eq!(instance.type_name.as_str(), "DefaultCircle");
    }

    #[test]
    fn non_constructible_implementation_fails_to_load() {
        let toml_str = SHAPES.replace(
            "kind = \"concrete\"",
            "kind = \"concrete\"\nconstructible = false",
        );
        let err = build_registry(&Manifest::from_toml(&toml_str).unwrap()).unwrap_err();
        assert!(err.to_string().contains("zero-argument constructor"));
    }

    #[test]
    fn duplicate_factory_in_manifest_names_source() {
        let toml_str = format!("{SHAPES}\n[[factories]]\ntype = \"Circle\"\nsource = \"PluginC\"\n");
        let err = build_registry(&Manifest::from_toml(&toml_str).unwrap()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRegistration { .. }));
        assert!(err.to_string().ends_with("by PluginA"));
    }

    #[test]
    fn load_registry_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SHAPES.as_bytes()).unwrap();
        let (manifest, registry) = load_registry(file.path()).unwrap();
        assert_eq!(manifest.family.root, "Shape");
        assert_eq!(registry.base_interface().as_str(), "Shape");
    }

    #[test]
    fn load_registry_reports_missing_manifest() {
        let err = load_registry(Path::new("/nonexistent/polyreg.toml")).unwrap_err();
        assert!(matches!(err, LoadError::Config(ConfigError::NotFound { .. })));
    }
}
