//! Default implementation resolution.
//!
//! A type either owns an implementation registration or inherits exactly one
//! from its ancestors. Anything else is an error: visitation order is never
//! used to pick between competing ancestors.

use polyreg_core::{ImplementationInfo, RegistryError, Result, TypeName};
use tracing::trace;

use crate::factory::InstanceFactory;

impl<T, C> InstanceFactory<T, C> {
    /// Find where `type_name` gets its default implementation from.
    ///
    /// Used for validation and diagnostics only; [`InstanceFactory::create`]
    /// never consults it.
    pub fn implementation_info(&self, type_name: impl Into<TypeName>) -> Result<ImplementationInfo> {
        let type_name = type_name.into();

        if let Some(own) = self.implementations.get(&type_name) {
            return Ok(ImplementationInfo::new(
                type_name,
                own.implementation.type_name().clone(),
            ));
        }

        let mut candidates: Vec<ImplementationInfo> = self
            .graph
            .walk_ancestors(&type_name, &self.base_interface)
            .into_iter()
            .filter_map(|ancestor| {
                let registration = self.implementations.get(&ancestor)?;
                Some(ImplementationInfo::new(
                    ancestor,
                    registration.implementation.type_name().clone(),
                ))
            })
            .collect();

        trace!(
            type_name = %type_name,
            candidates = candidates.len(),
            "Resolved implementation candidates"
        );

        match candidates.len() {
            0 => Err(RegistryError::NoDefaultImplementation { type_name }),
            1 => Ok(candidates.remove(0)),
            _ => Err(RegistryError::AmbiguousImplementation {
                type_name,
                candidates,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Implementation, InstanceFactory, RegistryError, TypeDecl, TypeName};

    type Registry = InstanceFactory<&'static str>;

    fn implementation(name: &str, extends: &str) -> Implementation<&'static str> {
        Implementation::constructible(TypeDecl::class(name).extends(extends), || "instance")
    }

    fn base() -> Registry {
        let mut registry = Registry::new("shape types", "Shape");
        registry
            .register_public_type(TypeDecl::interface("Named").extends("Shape"))
            .unwrap();
        registry
            .register_public_type(TypeDecl::interface("Drawable").extends("Shape"))
            .unwrap();
        registry
    }

    #[test]
    fn own_registration_short_circuits() {
        let mut registry = base();
        registry
            .register_public_type(TypeDecl::interface("Circle").extends("Named"))
            .unwrap();
        registry
            .register_implementation("Named", None, implementation("DefaultNamed", "Named"))
            .unwrap();
        registry
            .register_implementation("Circle", None, implementation("DefaultCircle", "Circle"))
            .unwrap();

        let info = registry.implementation_info("Circle").unwrap();
        assert_eq!(info.owner, TypeName::new("Circle"));
        assert_eq!(info.implementation, TypeName::new("DefaultCircle"));
    }

    #[test]
    fn single_ancestor_implementation_is_inherited() {
        let mut registry = base();
        registry
            .register_implementation("Named", None, implementation("DefaultNamed", "Named"))
            .unwrap();
        registry
            .register_public_type(TypeDecl::interface("Circle").extends("Named"))
            .unwrap();

        let info = registry.implementation_info("Circle").unwrap();
        assert_eq!(info.owner, TypeName::new("Named"));
        assert_eq!(info.implementation, TypeName::new("DefaultNamed"));
    }

    #[test]
    fn transitive_ancestor_implementation_is_inherited() {
        let mut registry = base();
        registry
            .register_implementation("Named", None, implementation("DefaultNamed", "Named"))
            .unwrap();
        registry
            .register_public_type(TypeDecl::interface("Circle").extends("Named"))
            .unwrap();
        registry
            .register_public_type(TypeDecl::interface("Ring").extends("Circle"))
            .unwrap();

        let info = registry.implementation_info("Ring").unwrap();
        assert_eq!(info.owner, TypeName::new("Named"));
    }

    #[test]
    fn diamond_with_two_implementations_is_ambiguous() {
        let mut registry = base();
        registry
            .register_implementation("Named", None, implementation("DefaultNamed", "Named"))
            .unwrap();
        registry
            .register_implementation(
                "Drawable",
                None,
                implementation("DefaultDrawable", "Drawable"),
            )
            .unwrap();
        registry
            .register_public_type(
                TypeDecl::interface("Circle")
                    .extends("Named")
                    .extends("Drawable"),
            )
            .unwrap();

        let err = registry.implementation_info("Circle").unwrap_err();
        match &err {
            RegistryError::AmbiguousImplementation { candidates, .. } => {
                let owners: Vec<&str> = candidates.iter().map(|c| c.owner.as_str()).collect();
                assert_eq!(owners, vec!["Named", "Drawable"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("'Named' implemented by 'DefaultNamed'"));
        assert!(msg.contains("'Drawable' implemented by 'DefaultDrawable'"));
    }

    #[test]
    fn shared_base_reached_twice_is_one_candidate() {
        let mut registry = base();
        registry
            .register_implementation("Shape", None, implementation("BaseShape", "Shape"))
            .unwrap();
        registry
            .register_public_type(
                TypeDecl::interface("Circle")
                    .extends("Named")
                    .extends("Drawable"),
            )
            .unwrap();

        let info = registry.implementation_info("Circle").unwrap();
        assert_eq!(info.owner, TypeName::new("Shape"));
    }

    #[test]
    fn related_ancestors_with_implementations_are_still_ambiguous() {
        let mut registry = base();
        registry
            .register_implementation("Shape", None, implementation("BaseShape", "Shape"))
            .unwrap();
        registry
            .register_implementation("Named", None, implementation("DefaultNamed", "Named"))
            .unwrap();
        registry
            .register_public_type(TypeDecl::interface("Circle").extends("Named"))
            .unwrap();

        let err = registry.implementation_info("Circle").unwrap_err();
        assert!(matches!(err, RegistryError::AmbiguousImplementation { .. }));
    }

    #[test]
    fn no_implementation_anywhere() {
        let mut registry = base();
        registry
            .register_public_type(TypeDecl::interface("Circle").extends("Named"))
            .unwrap();

        let err = registry.implementation_info("Circle").unwrap_err();
        assert!(matches!(err, RegistryError::NoDefaultImplementation { .. }));
        assert!(err.to_string().contains("'Circle'"));
    }

    #[test]
    fn implementation_on_foreign_ancestor_is_ignored() {
        let mut registry = base();
        registry.declare_type(TypeDecl::interface("Comparable")).unwrap();
        registry
            .register_implementation(
                "Comparable",
                None,
                Implementation::constructible(
                    TypeDecl::class("DefaultComparable")
                        .extends("Comparable")
                        .extends("Shape"),
                    || "instance",
                ),
            )
            .unwrap();
        registry
            .register_public_type(
                TypeDecl::interface("Circle")
                    .extends("Named")
                    .extends("Comparable"),
            )
            .unwrap();

        let err = registry.implementation_info("Circle").unwrap_err();
        assert!(matches!(err, RegistryError::NoDefaultImplementation { .. }));
    }
}
