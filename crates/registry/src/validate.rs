//! End-of-configuration validation sweep.

use chrono::{DateTime, Utc};
use polyreg_core::{ImplementationDefect, RegistryError, Result, TypeName};
use serde::Serialize;
use tracing::{info, warn};

use crate::factory::InstanceFactory;

/// One public type that failed validation.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationFailure {
    pub type_name: TypeName,
    pub message: String,
    #[serde(skip)]
    pub error: RegistryError,
}

/// Outcome of validating every public type, failures included.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Display name of the validated family.
    pub family: String,
    /// Number of public types checked.
    pub checked: usize,
    pub failures: Vec<ValidationFailure>,
    /// When the sweep ran.
    pub timestamp: DateTime<Utc>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// The first failure's error, if any.
    pub fn into_result(self) -> Result<()> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure.error),
            None => Ok(()),
        }
    }
}

impl<T, C> InstanceFactory<T, C> {
    /// Validate every public type, stopping at the first failure.
    pub fn validate_registrations(&self) -> Result<()> {
        for public_type in &self.public_types {
            self.validate_registration(public_type)?;
        }
        info!(
            family = %self.display_name(),
            types = self.public_types.len(),
            "Registrations validated"
        );
        Ok(())
    }

    /// Validate every public type and collect all failures.
    pub fn validation_report(&self) -> ValidationReport {
        let mut failures = Vec::new();
        for public_type in &self.public_types {
            if let Err(error) = self.validate_registration(public_type) {
                warn!(
                    family = %self.display_name(),
                    type_name = %public_type,
                    "Invalid registration: {error}"
                );
                failures.push(ValidationFailure {
                    type_name: public_type.clone(),
                    message: error.to_string(),
                    error,
                });
            }
        }
        info!(
            family = %self.display_name(),
            types = self.public_types.len(),
            failures = failures.len(),
            "Validation sweep complete"
        );
        ValidationReport {
            family: self.display_name().to_string(),
            checked: self.public_types.len(),
            failures,
            timestamp: Utc::now(),
        }
    }

    fn validate_registration(&self, public_type: &TypeName) -> Result<()> {
        // Registration lets through types whose ancestry was still incomplete.
        if !self.graph.is_assignable(&self.base_interface, public_type) {
            return Err(RegistryError::NotInFamily {
                type_name: public_type.clone(),
                root: self.base_interface.clone(),
            });
        }

        let Some(registration) = self.implementations.get(public_type) else {
            let info = self.implementation_info(public_type)?;
            if !self.graph.is_managed(public_type) && info.owner != *public_type {
                return Err(RegistryError::UnmanagedExtension {
                    type_name: public_type.clone(),
                    owner: info.owner,
                });
            }
            return Ok(());
        };

        let implementation = registration.implementation.type_name();
        let defect = if !self.graph.is_assignable(&self.base_interface, implementation) {
            Some(ImplementationDefect::NotAssignable {
                root: self.base_interface.clone(),
            })
        } else if !self.graph.is_assignable(public_type, implementation) {
            Some(ImplementationDefect::NotSubtype {
                of: public_type.clone(),
            })
        } else {
            None
        };
        if let Some(reason) = defect {
            return Err(RegistryError::InvalidImplementation {
                implementation: implementation.clone(),
                type_name: public_type.clone(),
                reason,
            });
        }

        // Only views attached to the type itself; ancestors' views are theirs to check.
        let Some(views) = self.internal_views.get(public_type) else {
            return Ok(());
        };
        for view in views {
            if !self.graph.is_assignable(&view.view, implementation) {
                return Err(RegistryError::IncompatibleInternalView {
                    type_name: public_type.clone(),
                    implementation: implementation.clone(),
                    view: view.view.clone(),
                    implementation_source: registration.source.clone(),
                    view_source: view.source.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Implementation, ImplementationDefect, InstanceFactory, RegistryError, TypeDecl};

    type Registry = InstanceFactory<String>;

    fn implementation(decl: TypeDecl) -> Implementation<String> {
        let name = decl.name.to_string();
        Implementation::constructible(decl, move || name.clone())
    }

    fn shapes() -> Registry {
        let mut registry = Registry::new("shape types", "Shape");
        registry
            .register_public_type(TypeDecl::interface("Circle").extends("Shape"))
            .unwrap();
        registry
            .register_public_type(TypeDecl::interface("Drawable").extends("Shape"))
            .unwrap();
        registry
            .register_implementation(
                "Drawable",
                None,
                implementation(TypeDecl::class("DefaultDrawable").extends("Drawable")),
            )
            .unwrap();
        registry
    }

    #[test]
    fn view_satisfied_by_implementation_passes() {
        let mut registry = shapes();
        registry
            .register_implementation(
                "Circle",
                Some("PluginA".into()),
                implementation(
                    TypeDecl::class("DefaultCircle")
                        .extends("Circle")
                        .extends("Resizable"),
                ),
            )
            .unwrap();
        registry.register_internal_view("Circle", Some("PluginB".into()), "Resizable");

        assert_eq!(
            registry.implementation_info("Circle").unwrap().implementation.as_str(),
            "DefaultCircle"
        );
        registry.validate_registrations().unwrap();
    }

    #[test]
    fn view_not_satisfied_is_reported_with_both_sources() {
        let mut registry = shapes();
        registry
            .register_implementation(
                "Circle",
                Some("PluginA".into()),
                implementation(TypeDecl::class("DefaultCircle").extends("Circle")),
            )
            .unwrap();
        registry.register_internal_view("Circle", Some("PluginB".into()), "Resizable");

        let err = registry.validate_registrations().unwrap_err();
        assert!(matches!(err, RegistryError::IncompatibleInternalView { .. }));
        assert_eq!(
            err.to_string(),
            "Factory registration for 'Circle' is invalid because the implementation type \
             'DefaultCircle' does not extend internal view 'Resizable', implementation type \
             was registered by PluginA, internal view was registered by PluginB"
        );
    }

    #[test]
    fn view_satisfied_transitively() {
        let mut registry = shapes();
        registry
            .declare_type(TypeDecl::interface("Scalable").extends("Resizable"))
            .unwrap();
        registry
            .register_implementation(
                "Circle",
                None,
                implementation(
                    TypeDecl::class("DefaultCircle")
                        .extends("Circle")
                        .extends("Scalable"),
                ),
            )
            .unwrap();
        registry.register_internal_view("Circle", None, "Resizable");
        registry.validate_registrations().unwrap();
    }

    #[test]
    fn views_on_type_without_own_implementation_are_not_checked() {
        let mut registry = shapes();
        registry
            .register_public_type(TypeDecl::interface("Sketch").extends("Drawable").managed())
            .unwrap();
        registry.register_internal_view("Sketch", None, "NeverImplemented");
        registry
            .register_implementation(
                "Circle",
                None,
                implementation(TypeDecl::class("DefaultCircle").extends("Circle")),
            )
            .unwrap();
        registry.validate_registrations().unwrap();
    }

    #[test]
    fn unmanaged_type_may_not_inherit() {
        let mut registry = shapes();
        registry
            .register_implementation(
                "Circle",
                None,
                implementation(TypeDecl::class("DefaultCircle").extends("Circle")),
            )
            .unwrap();
        registry
            .register_public_type(TypeDecl::interface("Sketch").extends("Drawable"))
            .unwrap();

        let err = registry.validate_registrations().unwrap_err();
        match &err {
            RegistryError::UnmanagedExtension { type_name, owner } => {
                assert_eq!(type_name.as_str(), "Sketch");
                assert_eq!(owner.as_str(), "Drawable");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("only managed types can extend unmanaged type 'Drawable'"));
    }

    #[test]
    fn managed_type_may_inherit() {
        let mut registry = shapes();
        registry
            .register_implementation(
                "Circle",
                None,
                implementation(TypeDecl::class("DefaultCircle").extends("Circle")),
            )
            .unwrap();
        registry
            .register_public_type(TypeDecl::interface("Sketch").extends("Drawable").managed())
            .unwrap();
        registry.validate_registrations().unwrap();
    }

    #[test]
    fn public_type_without_any_implementation_fails() {
        let registry = shapes();
        let err = registry.validate_registrations().unwrap_err();
        assert!(matches!(err, RegistryError::NoDefaultImplementation { .. }));
        assert_eq!(err.type_name().as_str(), "Circle");
    }

    #[test]
    fn public_type_never_connected_to_root_fails_validation() {
        let mut registry = shapes();
        registry
            .register_implementation(
                "Circle",
                None,
                implementation(TypeDecl::class("DefaultCircle").extends("Circle")),
            )
            .unwrap();
        registry
            .register_public_type(TypeDecl::interface("Ring").extends("Oval").managed())
            .unwrap();

        let err = registry.validate_registrations().unwrap_err();
        match &err {
            RegistryError::NotInFamily { type_name, root } => {
                assert_eq!(type_name.as_str(), "Ring");
                assert_eq!(root.as_str(), "Shape");
            }
            other => panic!("unexpected error: {other}"),
        }
        let report = registry.validation_report();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].type_name.as_str(), "Ring");
    }

    #[test]
    fn implementation_left_unconnected_fails_validation() {
        let mut registry = shapes();
        registry
            .register_implementation(
                "Circle",
                Some("PluginA".into()),
                implementation(TypeDecl::class("DefaultCircle").extends("RoundThing")),
            )
            .unwrap();

        let err = registry.validate_registrations().unwrap_err();
        match &err {
            RegistryError::InvalidImplementation {
                implementation,
                type_name,
                reason,
            } => {
                assert_eq!(implementation.as_str(), "DefaultCircle");
                assert_eq!(type_name.as_str(), "Circle");
                assert_eq!(
                    *reason,
                    ImplementationDefect::NotAssignable {
                        root: "Shape".into()
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn implementation_connected_later_validates() {
        let mut registry = shapes();
        registry
            .register_implementation(
                "Circle",
                None,
                implementation(TypeDecl::class("DefaultCircle").extends("RoundThing")),
            )
            .unwrap();
        registry
            .declare_type(TypeDecl::interface("RoundThing").extends("Circle"))
            .unwrap();
        registry.validate_registrations().unwrap();
    }

    #[test]
    fn report_collects_every_failure_in_registration_order() {
        let mut registry = shapes();
        registry
            .register_public_type(TypeDecl::interface("Sketch").extends("Drawable"))
            .unwrap();

        let report = registry.validation_report();
        assert!(!report.is_ok());
        assert_eq!(report.checked, 3);
        let failed: Vec<&str> = report.failures.iter().map(|f| f.type_name.as_str()).collect();
        assert_eq!(failed, vec!["Circle", "Sketch"]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["family"], "shape types");
        assert!(json["failures"][0]["message"].as_str().unwrap().contains("Circle"));

        let err = report.into_result().unwrap_err();
        assert!(matches!(err, RegistryError::NoDefaultImplementation { .. }));
    }

    #[test]
    fn clean_report_converts_to_ok() {
        let mut registry = shapes();
        registry
            .register_implementation(
                "Circle",
                None,
                implementation(TypeDecl::class("DefaultCircle").extends("Circle")),
            )
            .unwrap();
        let report = registry.validation_report();
        assert!(report.is_ok());
        report.into_result().unwrap();
    }
}
