//! Manifest loading and validation for polyreg.
//!
//! A manifest describes one type family in TOML: the root interface, the
//! declared types and their supertypes, and what each contributor registers
//! (implementations, internal views, factories). The manifest is resolved
//! from `--manifest`, then `POLYREG_MANIFEST`, then `./polyreg.toml`.

use polyreg_core::{TypeDecl, TypeKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Environment variable naming the manifest when no path is given.
pub const MANIFEST_ENV: &str = "POLYREG_MANIFEST";

/// Manifest file looked up in the working directory as a last resort.
pub const DEFAULT_MANIFEST: &str = "polyreg.toml";

/// The root manifest structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// The family being described
    pub family: FamilyConfig,

    /// Every type taking part in resolution (public or not)
    #[serde(default)]
    pub types: Vec<TypeConfig>,

    /// Default implementation registrations
    #[serde(default)]
    pub implementations: Vec<ImplementationConfig>,

    /// Internal view registrations
    #[serde(default)]
    pub views: Vec<ViewConfig>,

    /// Factory registrations
    #[serde(default)]
    pub factories: Vec<FactoryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyConfig {
    /// Human-readable family name used in error messages
    #[serde(default = "default_display_name")]
    pub display_name: String,

    /// The root interface every public type must extend
    pub root: String,

    /// How `check` reports failures
    #[serde(default)]
    pub validation: ValidationPolicy,
}

fn default_display_name() -> String {
    "polyreg types".into()
}

/// Whether validation stops at the first invalid type or reports them all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    #[default]
    FailFast,
    Aggregate,
}

/// A declared type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeConfig {
    pub name: String,

    /// Immediate supertypes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,

    /// interface | abstract | concrete
    #[serde(default)]
    pub kind: TypeKind,

    /// Whether the type is registered as public
    #[serde(default)]
    pub public: bool,

    /// Generated shape; may inherit an ancestor's implementation
    #[serde(default)]
    pub managed: bool,

    /// Whether a concrete type offers a zero-argument constructor
    #[serde(default = "default_true")]
    pub constructible: bool,
}

fn default_true() -> bool {
    true
}

impl TypeConfig {
    pub fn to_decl(&self) -> TypeDecl {
        let mut decl = TypeDecl::new(self.name.as_str(), self.kind);
        for supertype in &self.extends {
            decl = decl.extends(supertype.as_str());
        }
        if self.managed {
            decl = decl.managed();
        }
        decl
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplementationConfig {
    /// The public type receiving the implementation
    #[serde(rename = "type")]
    pub type_name: String,

    /// The implementation type, declared in `[[types]]`
    pub implementation: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(rename = "type")]
    pub type_name: String,

    pub view: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactoryConfig {
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Manifest {
    /// Load and validate the manifest at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let manifest: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        manifest.validate()?;
        tracing::info!(
            family = %manifest.family.display_name,
            path = %path.display(),
            types = manifest.types.len(),
            "Loaded manifest"
        );
        Ok(manifest)
    }

    /// Parse and validate a manifest held in memory.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let manifest: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            reason: e.to_string(),
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Pick the manifest path: explicit argument, then `POLYREG_MANIFEST`,
    /// then `./polyreg.toml`.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        match std::env::var(MANIFEST_ENV) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => PathBuf::from(DEFAULT_MANIFEST),
        }
    }

    /// Validate the manifest's internal consistency.
    ///
    /// Registry-level rules (duplicates, assignability, ambiguity) are left to
    /// the registry itself so that its attributed errors surface unchanged.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.family.root.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "family.root must name the root interface".into(),
            ));
        }

        let mut declared = HashSet::new();
        for ty in &self.types {
            if ty.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "type names cannot be empty".into(),
                ));
            }
            if !declared.insert(ty.name.trim()) {
                return Err(ConfigError::ValidationError(format!(
                    "type '{}' is declared more than once",
                    ty.name
                )));
            }
            if ty.extends.iter().any(|s| s.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "type '{}' extends an empty type name",
                    ty.name
                )));
            }
        }

        for imp in &self.implementations {
            require_name("implementations.type", &imp.type_name)?;
            require_name("implementations.implementation", &imp.implementation)?;
            if !declared.contains(imp.implementation.trim()) {
                return Err(ConfigError::ValidationError(format!(
                    "implementation '{}' for '{}' is not declared in [[types]]",
                    imp.implementation, imp.type_name
                )));
            }
        }
        for view in &self.views {
            require_name("views.type", &view.type_name)?;
            require_name("views.view", &view.view)?;
        }
        for factory in &self.factories {
            require_name("factories.type", &factory.type_name)?;
        }
        Ok(())
    }

    /// Look up a declared type by name.
    pub fn type_config(&self, name: &str) -> Option<&TypeConfig> {
        self.types.iter().find(|t| t.name.trim() == name.trim())
    }

    /// A small, valid manifest (for `polyreg init`).
    pub fn example() -> Self {
        let ty = |name: &str, extends: &[&str], kind: TypeKind, public: bool| TypeConfig {
            name: name.into(),
            extends: extends.iter().map(|s| s.to_string()).collect(),
            kind,
            public,
            managed: false,
            constructible: true,
        };
        Self {
            family: FamilyConfig {
                display_name: "shape types".into(),
                root: "Shape".into(),
                validation: ValidationPolicy::FailFast,
            },
            types: vec![
                ty("Circle", &["Shape"], TypeKind::Interface, true),
                ty("Resizable", &[], TypeKind::Interface, false),
                ty(
                    "DefaultCircle",
                    &["Circle", "Resizable"],
                    TypeKind::Concrete,
                    false,
                ),
            ],
            implementations: vec![ImplementationConfig {
                type_name: "Circle".into(),
                implementation: "DefaultCircle".into(),
                source: Some("core shapes".into()),
            }],
            views: vec![ViewConfig {
                type_name: "Circle".into(),
                view: "Resizable".into(),
                source: Some("core shapes".into()),
            }],
            factories: vec![FactoryConfig {
                type_name: "Circle".into(),
                source: Some("core shapes".into()),
            }],
        }
    }

    /// Render [`Manifest::example`] as TOML.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::example()).unwrap_or_default()
    }
}

fn require_name(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{field} cannot be empty"
        )));
    }
    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No manifest found at {path}; run `polyreg init` or pass --manifest")]
    NotFound { path: PathBuf },

    #[error("Failed to read manifest at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse manifest at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Manifest validation failed: {0}")]
    ValidationError(String),
}
