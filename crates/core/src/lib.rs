//! # polyreg core
//!
//! Type identities, the declared type graph, and error definitions shared by
//! every polyreg crate. This crate knows nothing about factories or
//! implementations; it only answers "what is this type" and "what does it
//! extend".
//!
//! ## Design Philosophy
//!
//! There is no runtime reflection to lean on, so the subtype relation is
//! declared explicitly when types are registered:
//! - every type is identified by a canonical [`TypeName`]
//! - each [`TypeDecl`] lists its immediate supertypes
//! - assignability is plain reachability over the [`TypeGraph`]

pub mod error;
pub mod hierarchy;
pub mod source;
pub mod type_name;

// Re-export key types at crate root for ergonomics
pub use error::{ImplementationDefect, RegistrationKind, RegistryError, Result};
pub use hierarchy::{ImplementationInfo, Reachability, TypeDecl, TypeGraph, TypeKind};
pub use source::Source;
pub use type_name::TypeName;
