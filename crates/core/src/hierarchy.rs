//! Declared type hierarchy.
//!
//! Every type that takes part in resolution is declared up front together
//! with its immediate supertypes. Assignability and ancestor walks are
//! answered from that explicit graph, never from a runtime type system.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use tracing::trace;

use crate::error::{RegistryError, Result};
use crate::type_name::TypeName;

/// What shape a declared type has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// A contract with no state of its own.
    #[default]
    Interface,
    /// A partial implementation that cannot be instantiated.
    Abstract,
    /// A class that can be instantiated.
    Concrete,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interface => f.write_str("interface"),
            Self::Abstract => f.write_str("abstract class"),
            Self::Concrete => f.write_str("class"),
        }
    }
}

/// A type together with its immediate supertypes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: TypeName,

    /// Immediate supertypes, in declaration order.
    #[serde(default)]
    pub supertypes: Vec<TypeName>,

    #[serde(default)]
    pub kind: TypeKind,

    /// Shape is generated rather than hand written; such a type may inherit
    /// an ancestor's default implementation.
    #[serde(default)]
    pub managed: bool,
}

impl TypeDecl {
    pub fn new(name: impl Into<TypeName>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            supertypes: Vec::new(),
            kind,
            managed: false,
        }
    }

    pub fn interface(name: impl Into<TypeName>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    pub fn abstract_class(name: impl Into<TypeName>) -> Self {
        Self::new(name, TypeKind::Abstract)
    }

    pub fn class(name: impl Into<TypeName>) -> Self {
        Self::new(name, TypeKind::Concrete)
    }

    /// Add an immediate supertype. Repeats are ignored.
    pub fn extends(mut self, supertype: impl Into<TypeName>) -> Self {
        let supertype = supertype.into();
        if !self.supertypes.contains(&supertype) {
            self.supertypes.push(supertype);
        }
        self
    }

    pub fn managed(mut self) -> Self {
        self.managed = true;
        self
    }

    pub fn is_concrete(&self) -> bool {
        self.kind == TypeKind::Concrete
    }
}

impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.managed {
            f.write_str("managed ")?;
        }
        write!(f, "{} {}", self.kind, self.name)?;
        if !self.supertypes.is_empty() {
            let names: Vec<&str> = self.supertypes.iter().map(TypeName::as_str).collect();
            write!(f, " extends {}", names.join(", "))?;
        }
        Ok(())
    }
}

/// "Type `owner` provides its default shape through `implementation`."
///
/// Produced by resolution, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImplementationInfo {
    pub owner: TypeName,
    pub implementation: TypeName,
}

impl ImplementationInfo {
    pub fn new(owner: impl Into<TypeName>, implementation: impl Into<TypeName>) -> Self {
        Self {
            owner: owner.into(),
            implementation: implementation.into(),
        }
    }
}

impl fmt::Display for ImplementationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' implemented by '{}'", self.owner, self.implementation)
    }
}

/// Answer to "does this declaration extend that type" while the graph is
/// still being filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    Reaches,
    DoesNotReach,
    /// Not reached so far, but an ancestor on the way is not declared yet.
    Undecided,
}

/// The explicit subtype relation of one type family.
///
/// Names that are referenced as supertypes but never declared are treated as
/// leaves with no supertypes of their own.
#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    decls: HashMap<TypeName, TypeDecl>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph holding only the interface `root`.
    pub fn rooted(root: impl Into<TypeName>) -> Self {
        let root = TypeDecl::interface(root);
        let mut decls = HashMap::new();
        decls.insert(root.name.clone(), root);
        Self { decls }
    }

    /// Declare a type.
    ///
    /// Re-declaring an identical type is a no-op. A differing re-declaration,
    /// or one that would make the type its own ancestor, is rejected.
    pub fn declare(&mut self, decl: TypeDecl) -> Result<()> {
        if let Some(existing) = self.decls.get(&decl.name) {
            if *existing == decl {
                return Ok(());
            }
            return Err(RegistryError::ConflictingDeclaration {
                type_name: decl.name.clone(),
                existing: Box::new(existing.clone()),
                incoming: Box::new(decl),
            });
        }

        for supertype in &decl.supertypes {
            if self.is_assignable(&decl.name, supertype) {
                return Err(RegistryError::CyclicHierarchy {
                    type_name: decl.name.clone(),
                    supertype: supertype.clone(),
                });
            }
        }

        trace!(type_name = %decl.name, "Declared type");
        self.decls.insert(decl.name.clone(), decl);
        Ok(())
    }

    pub fn get(&self, name: &TypeName) -> Option<&TypeDecl> {
        self.decls.get(name)
    }

    pub fn contains(&self, name: &TypeName) -> bool {
        self.decls.contains_key(name)
    }

    /// Immediate supertypes of `name`; empty for undeclared names.
    pub fn supertypes(&self, name: &TypeName) -> &[TypeName] {
        self.decls
            .get(name)
            .map(|d| d.supertypes.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_managed(&self, name: &TypeName) -> bool {
        self.decls.get(name).is_some_and(|d| d.managed)
    }

    /// Whether a value of type `candidate` can be used where `target` is expected.
    pub fn is_assignable(&self, target: &TypeName, candidate: &TypeName) -> bool {
        if target == candidate {
            return true;
        }
        self.ancestors(candidate).iter().any(|a| a == target)
    }

    /// Every transitive supertype of `name`, breadth first, each once, `name` excluded.
    pub fn ancestors(&self, name: &TypeName) -> Vec<TypeName> {
        let mut seen: HashSet<&TypeName> = HashSet::new();
        let mut queue: VecDeque<&TypeName> = VecDeque::new();
        let mut out = Vec::new();

        seen.insert(name);
        queue.extend(self.supertypes(name));

        while let Some(next) = queue.pop_front() {
            if !seen.insert(next) {
                continue;
            }
            out.push(next.clone());
            queue.extend(self.supertypes(next));
        }
        out
    }

    /// Whether `decl`, declared or not, extends `target`.
    ///
    /// Undeclared supertypes are normally leaves; here they leave the answer
    /// open, since a later declaration may still connect them to `target`.
    pub fn reaches(&self, decl: &TypeDecl, target: &TypeName) -> Reachability {
        if decl.name == *target {
            return Reachability::Reaches;
        }
        let mut seen: HashSet<&TypeName> = HashSet::new();
        let mut queue: VecDeque<&TypeName> = decl.supertypes.iter().collect();
        let mut open = false;

        while let Some(next) = queue.pop_front() {
            if next == target {
                return Reachability::Reaches;
            }
            if !seen.insert(next) {
                continue;
            }
            match self.decls.get(next) {
                Some(d) => queue.extend(&d.supertypes),
                None => open = true,
            }
        }
        if open {
            Reachability::Undecided
        } else {
            Reachability::DoesNotReach
        }
    }

    /// The ancestors of `name` that are themselves assignable to `root`.
    ///
    /// Order is breadth first and only fixes diagnostic output; callers must
    /// not use it to break ties between candidates.
    pub fn walk_ancestors(&self, name: &TypeName, root: &TypeName) -> Vec<TypeName> {
        self.ancestors(name)
            .into_iter()
            .filter(|ancestor| self.is_assignable(root, ancestor))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}
