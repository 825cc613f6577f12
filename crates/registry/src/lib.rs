//! Polymorphic instance factory for one family of domain types.
//!
//! Independent contributors declare, per public type, how instances are
//! produced: through an explicit factory looked up by exact type, or through
//! a default implementation inherited along the declared supertype chain.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   register_*   ┌──────────────────┐
//! │  Plugins    │───────────────▶│  InstanceFactory │
//! └─────────────┘                │  (store)         │
//!                                └────────┬─────────┘
//!                    validate_registrations│  create
//!                          ┌──────────────┴───────────┐
//!                          ▼                          ▼
//!                   ┌────────────┐            ┌──────────────┐
//!                   │  Resolver  │            │ exact-match  │
//!                   │ (TypeGraph)│            │ factory call │
//!                   └────────────┘            └──────────────┘
//! ```
//!
//! Registration happens during a single configuration phase, validation runs
//! once at its end, and creation is used afterwards.

mod factory;
pub mod loader;
mod resolve;
mod validate;

pub use factory::{FactoryFn, Implementation, InstanceFactory};
pub use loader::{
    CreationContext, DeclaredInstance, LoadError, ManifestRegistry, build_registry, load_registry,
};
pub use validate::{ValidationFailure, ValidationReport};

pub use polyreg_core::{
    ImplementationDefect, ImplementationInfo, Reachability, RegistrationKind, RegistryError,
    Result, Source, TypeDecl, TypeGraph, TypeKind, TypeName,
};
