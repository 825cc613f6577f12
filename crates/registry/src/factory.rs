//! Registration store, registrar and instance creator.

use indexmap::IndexSet;
use polyreg_core::{
    ImplementationDefect, Reachability, RegistrationKind, RegistryError, Result, Source,
    TypeDecl, TypeGraph, TypeName,
};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Builds an instance from its name and the creation context.
pub type FactoryFn<T, C> = Box<dyn Fn(&str, &mut C) -> T>;

/// A default implementation type offered for a public type.
///
/// The declaration places the implementation in the type graph; the
/// constructor is the zero-argument way of producing one. An implementation
/// without a constructor is rejected at registration.
pub struct Implementation<T> {
    decl: TypeDecl,
    constructor: Option<Box<dyn Fn() -> T>>,
}

impl<T> Implementation<T> {
    /// An implementation with no constructor.
    pub fn new(decl: TypeDecl) -> Self {
        Self {
            decl,
            constructor: None,
        }
    }

    /// An implementation instantiated by `constructor`.
    pub fn constructible(decl: TypeDecl, constructor: impl Fn() -> T + 'static) -> Self {
        Self {
            decl,
            constructor: Some(Box::new(constructor)),
        }
    }

    pub fn type_name(&self) -> &TypeName {
        &self.decl.name
    }

    pub fn decl(&self) -> &TypeDecl {
        &self.decl
    }

    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    pub(crate) fn instantiate(&self) -> Option<T> {
        self.constructor.as_ref().map(|construct| construct())
    }
}

impl<T> fmt::Debug for Implementation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Implementation")
            .field("decl", &self.decl)
            .field("constructor", &self.constructor.is_some())
            .finish()
    }
}

pub(crate) struct FactoryRegistration<T, C> {
    pub(crate) source: Option<Source>,
    pub(crate) factory: FactoryFn<T, C>,
}

pub(crate) struct ImplementationRegistration<T> {
    pub(crate) source: Option<Source>,
    pub(crate) implementation: Implementation<T>,
}

pub(crate) struct InternalViewRegistration {
    pub(crate) source: Option<Source>,
    pub(crate) view: TypeName,
}

/// The registry for one family of types sharing a root interface.
///
/// `T` is what factories and constructors produce (typically a boxed trait
/// object), `C` is the context handed to factories at creation time.
///
/// Mutation goes through `&mut self`; the registry is built on one thread
/// during configuration and only read afterwards.
pub struct InstanceFactory<T, C = ()> {
    display_name: String,
    pub(crate) base_interface: TypeName,
    pub(crate) graph: TypeGraph,
    pub(crate) public_types: IndexSet<TypeName>,
    pub(crate) factories: HashMap<TypeName, FactoryRegistration<T, C>>,
    pub(crate) implementations: HashMap<TypeName, ImplementationRegistration<T>>,
    pub(crate) internal_views: HashMap<TypeName, Vec<InternalViewRegistration>>,
}

impl<T, C> InstanceFactory<T, C> {
    /// Create an empty registry. The root interface is declared in the type graph.
    pub fn new(display_name: impl Into<String>, base_interface: impl Into<TypeName>) -> Self {
        let base_interface = base_interface.into();
        Self {
            display_name: display_name.into(),
            graph: TypeGraph::rooted(base_interface.clone()),
            base_interface,
            public_types: IndexSet::new(),
            factories: HashMap::new(),
            implementations: HashMap::new(),
            internal_views: HashMap::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn base_interface(&self) -> &TypeName {
        &self.base_interface
    }

    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    /// Declare a supporting type (ancestor interface, implementation class,
    /// internal view) without making it public.
    pub fn declare_type(&mut self, decl: TypeDecl) -> Result<()> {
        self.graph.declare(decl)
    }

    /// Declare `decl` and mark it usable by the family. Idempotent.
    ///
    /// Contributors register in any order, so a type whose supertypes are not
    /// all declared yet is accepted and its family membership is checked again
    /// by validation. Only a type whose whole ancestry is known and misses the
    /// root is rejected here.
    pub fn register_public_type(&mut self, decl: TypeDecl) -> Result<()> {
        match self.graph.reaches(&decl, &self.base_interface) {
            Reachability::DoesNotReach => {
                return Err(RegistryError::NotInFamily {
                    type_name: decl.name,
                    root: self.base_interface.clone(),
                });
            }
            Reachability::Undecided => debug!(
                family = %self.display_name,
                type_name = %decl.name,
                "Public type not yet connected to the root"
            ),
            Reachability::Reaches => {}
        }
        let type_name = decl.name.clone();
        self.graph.declare(decl)?;
        if self.public_types.insert(type_name.clone()) {
            debug!(family = %self.display_name, type_name = %type_name, "Registered public type");
        }
        Ok(())
    }

    /// Register the construction function for exactly `type_name`.
    pub fn register_factory<F>(
        &mut self,
        type_name: impl Into<TypeName>,
        source: Option<Source>,
        factory: F,
    ) -> Result<()>
    where
        F: Fn(&str, &mut C) -> T + 'static,
    {
        let type_name = type_name.into();
        if let Some(existing) = self.factories.get(&type_name) {
            return Err(RegistryError::DuplicateRegistration {
                kind: RegistrationKind::Factory,
                type_name,
                previous: existing.source.clone(),
            });
        }
        debug!(
            family = %self.display_name,
            type_name = %type_name,
            source = ?source.as_ref().map(Source::as_str),
            "Registered factory"
        );
        self.factories.insert(
            type_name,
            FactoryRegistration {
                source,
                factory: Box::new(factory),
            },
        );
        Ok(())
    }

    /// Register the default implementation for exactly `type_name`.
    ///
    /// The implementation must be assignable to the root interface and to
    /// `type_name`, be concrete, and carry a zero-argument constructor, checked
    /// in that order before the duplicate check. Assignability that still
    /// depends on undeclared types is checked again by validation.
    pub fn register_implementation(
        &mut self,
        type_name: impl Into<TypeName>,
        source: Option<Source>,
        implementation: Implementation<T>,
    ) -> Result<()> {
        let type_name = type_name.into();
        let invalid = |reason| RegistryError::InvalidImplementation {
            implementation: implementation.type_name().clone(),
            type_name: type_name.clone(),
            reason,
        };

        let decl = implementation.decl();
        if self.graph.reaches(decl, &self.base_interface) == Reachability::DoesNotReach {
            return Err(invalid(ImplementationDefect::NotAssignable {
                root: self.base_interface.clone(),
            }));
        }
        if self.graph.reaches(decl, &type_name) == Reachability::DoesNotReach {
            return Err(invalid(ImplementationDefect::NotSubtype {
                of: type_name.clone(),
            }));
        }
        if !decl.is_concrete() {
            return Err(invalid(ImplementationDefect::Abstract));
        }
        if !implementation.has_constructor() {
            return Err(invalid(ImplementationDefect::NoDefaultConstructor));
        }

        if let Some(existing) = self.implementations.get(&type_name) {
            return Err(RegistryError::DuplicateRegistration {
                kind: RegistrationKind::Implementation,
                type_name,
                previous: existing.source.clone(),
            });
        }

        self.graph.declare(implementation.decl().clone())?;
        debug!(
            family = %self.display_name,
            type_name = %type_name,
            implementation = %implementation.type_name(),
            source = ?source.as_ref().map(Source::as_str),
            "Registered implementation"
        );
        self.implementations.insert(
            type_name,
            ImplementationRegistration {
                source,
                implementation,
            },
        );
        Ok(())
    }

    /// Attach an internal view to `type_name`. Always succeeds; repeats are kept.
    pub fn register_internal_view(
        &mut self,
        type_name: impl Into<TypeName>,
        source: Option<Source>,
        view: impl Into<TypeName>,
    ) {
        let type_name = type_name.into();
        let view = view.into();
        debug!(
            family = %self.display_name,
            type_name = %type_name,
            view = %view,
            "Registered internal view"
        );
        self.internal_views
            .entry(type_name)
            .or_default()
            .push(InternalViewRegistration { source, view });
    }

    /// Snapshot of the explicitly registered public types, in registration order.
    pub fn supported_types(&self) -> IndexSet<TypeName> {
        self.public_types.clone()
    }

    /// The distinct views attached to exactly `type_name`; empty when none.
    pub fn internal_views(&self, type_name: impl Into<TypeName>) -> IndexSet<TypeName> {
        let type_name: TypeName = type_name.into();
        self.internal_views
            .get(&type_name)
            .map(|views| views.iter().map(|r| r.view.clone()).collect())
            .unwrap_or_default()
    }

    /// Create an instance through the factory registered for exactly `type_name`.
    ///
    /// The factory's result is returned as is. Supertypes are never consulted.
    pub fn create(&self, type_name: impl Into<TypeName>, context: &mut C, name: &str) -> Result<T> {
        let type_name = type_name.into();
        match self.factories.get(&type_name) {
            Some(registration) => Ok((registration.factory)(name, context)),
            None => Err(RegistryError::UnknownType {
                type_name,
                family: self.display_name.clone(),
                known: self.supported_type_names(),
            }),
        }
    }

    /// Instantiate the default implementation `type_name` resolves to.
    pub fn new_default_instance(&self, type_name: impl Into<TypeName>) -> Result<T> {
        let type_name = type_name.into();
        let info = self.implementation_info(&type_name)?;
        self.implementations
            .get(&info.owner)
            .and_then(|r| r.implementation.instantiate())
            .ok_or(RegistryError::InvalidImplementation {
                implementation: info.implementation,
                type_name,
                reason: ImplementationDefect::NoDefaultConstructor,
            })
    }

    pub fn has_factory(&self, type_name: impl Into<TypeName>) -> bool {
        let type_name: TypeName = type_name.into();
        self.factories.contains_key(&type_name)
    }

    pub fn has_implementation(&self, type_name: impl Into<TypeName>) -> bool {
        let type_name: TypeName = type_name.into();
        self.implementations.contains_key(&type_name)
    }

    // ── Internal ───────────────────────────────────────────────────

    /// Names of every type with a factory, sorted. Simple names, except where
    /// two types share one and only the full name tells them apart.
    fn supported_type_names(&self) -> Vec<String> {
        let mut simple_counts: HashMap<&str, usize> = HashMap::new();
        for type_name in self.factories.keys() {
            *simple_counts.entry(type_name.simple_name()).or_default() += 1;
        }
        let mut names: Vec<String> = self
            .factories
            .keys()
            .map(|t| {
                let simple = t.simple_name();
                if simple_counts.get(simple).is_some_and(|&n| n > 1) {
                    t.to_string()
                } else {
                    simple.to_string()
                }
            })
            .collect();
        names.sort();
        names
    }
}

impl<T, C> fmt::Display for InstanceFactory<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.supported_type_names();
        if names.is_empty() {
            f.write_str("[(None)]")
        } else {
            write!(f, "[{}]", names.join(", "))
        }
    }
}

impl<T, C> fmt::Debug for InstanceFactory<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceFactory")
            .field("display_name", &self.display_name)
            .field("base_interface", &self.base_interface)
            .field("public_types", &self.public_types)
            .field("factories", &self.supported_type_names())
            .field("implementations", &self.implementations.len())
            .finish()
    }
}
