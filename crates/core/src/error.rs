//! Error types for the polyreg domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Every variant that can
//! name the contributor responsible for a conflicting registration does so.

use std::fmt;

use thiserror::Error;

use crate::hierarchy::{ImplementationInfo, TypeDecl};
use crate::source::Source;
use crate::type_name::TypeName;

/// Result type alias using our error.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Which association a duplicate registration collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationKind {
    Factory,
    Implementation,
}

impl fmt::Display for RegistrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Factory => f.write_str("a factory"),
            Self::Implementation => f.write_str("an implementation type"),
        }
    }
}

/// The registration-time check an implementation type failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImplementationDefect {
    /// Not assignable to the family's root interface.
    NotAssignable { root: TypeName },
    /// Does not extend the type it is registered for.
    NotSubtype { of: TypeName },
    /// Declared abstract or as an interface.
    Abstract,
    /// No zero-argument constructor was supplied.
    NoDefaultConstructor,
}

impl fmt::Display for ImplementationDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAssignable { root } => write!(f, "must extend '{root}'"),
            Self::NotSubtype { of } => write!(f, "must be a subtype of '{of}'"),
            Self::Abstract => f.write_str("must not be abstract"),
            Self::NoDefaultConstructor => f.write_str("must have a zero-argument constructor"),
        }
    }
}

/// All registry failures. None are retryable; each aborts the call that raised it.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    // --- Registration ---
    #[error(
        "Cannot register {kind} for type '{type_name}' because {kind} for this type was already registered{}",
        registered_by(" by ", .previous)
    )]
    DuplicateRegistration {
        kind: RegistrationKind,
        type_name: TypeName,
        previous: Option<Source>,
    },

    #[error("Implementation type '{implementation}' registered for '{type_name}' {reason}")]
    InvalidImplementation {
        implementation: TypeName,
        type_name: TypeName,
        reason: ImplementationDefect,
    },

    #[error("Type '{type_name}' cannot be registered as a public type because it is not assignable to '{root}'")]
    NotInFamily { type_name: TypeName, root: TypeName },

    // --- Type graph ---
    #[error("Type '{type_name}' is already declared as `{existing}`, cannot redeclare it as `{incoming}`")]
    ConflictingDeclaration {
        type_name: TypeName,
        existing: Box<TypeDecl>,
        incoming: Box<TypeDecl>,
    },

    #[error("Type '{type_name}' cannot extend '{supertype}' because '{supertype}' already extends '{type_name}'")]
    CyclicHierarchy {
        type_name: TypeName,
        supertype: TypeName,
    },

    // --- Resolution ---
    #[error(
        "Factory registration for '{type_name}' is invalid because it doesn't extend an interface with a default implementation"
    )]
    NoDefaultImplementation { type_name: TypeName },

    #[error(
        "Factory registration for '{type_name}' is invalid because it has multiple default implementations registered, super-types that registered an implementation are: {}",
        join(.candidates)
    )]
    AmbiguousImplementation {
        type_name: TypeName,
        candidates: Vec<ImplementationInfo>,
    },

    // --- Validation ---
    #[error(
        "Factory registration for '{type_name}' is invalid because the implementation type '{implementation}' does not extend internal view '{view}'{}{}",
        registered_by(", implementation type was registered by ", .implementation_source),
        registered_by(", internal view was registered by ", .view_source)
    )]
    IncompatibleInternalView {
        type_name: TypeName,
        implementation: TypeName,
        view: TypeName,
        implementation_source: Option<Source>,
        view_source: Option<Source>,
    },

    #[error(
        "Factory registration for '{type_name}' is invalid because only managed types can extend unmanaged type '{owner}'"
    )]
    UnmanagedExtension { type_name: TypeName, owner: TypeName },

    // --- Creation ---
    #[error(
        "Cannot create a {} because this type is not known to {family}. Known types are: {}",
        .type_name.simple_name(),
        known_names(.known)
    )]
    UnknownType {
        type_name: TypeName,
        family: String,
        known: Vec<String>,
    },
}

impl RegistryError {
    /// The type the failure is about.
    pub fn type_name(&self) -> &TypeName {
        match self {
            Self::DuplicateRegistration { type_name, .. }
            | Self::InvalidImplementation { type_name, .. }
            | Self::NotInFamily { type_name, .. }
            | Self::ConflictingDeclaration { type_name, .. }
            | Self::CyclicHierarchy { type_name, .. }
            | Self::NoDefaultImplementation { type_name }
            | Self::AmbiguousImplementation { type_name, .. }
            | Self::IncompatibleInternalView { type_name, .. }
            | Self::UnmanagedExtension { type_name, .. }
            | Self::UnknownType { type_name, .. } => type_name,
        }
    }
}

fn registered_by(prefix: &str, source: &Option<Source>) -> String {
    match source {
        Some(source) => format!("{prefix}{source}"),
        None => String::new(),
    }
}

fn join(candidates: &[ImplementationInfo]) -> String {
    candidates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn known_names(known: &[String]) -> String {
    if known.is_empty() {
        "(None)".into()
    } else {
        known.join(", ")
    }
}
