//! Canonical type identity.
//!
//! A [`TypeName`] stands in for a class token. Every map and set in the
//! registry is keyed by it, so two spellings of "the same" type must be
//! normalised to one string before they reach the registry.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Identifier of a type within a family, e.g. `shapes.Circle`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(Arc<str>);

impl TypeName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref().trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last dotted segment (`shapes.Circle` → `Circle`).
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TypeName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&TypeName> for TypeName {
    fn from(t: &TypeName) -> Self {
        t.clone()
    }
}

impl Borrow<str> for TypeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn simple_name_strips_namespace() {
        assert_eq!(TypeName::new("shapes.geometry.Circle").simple_name(), "Circle");
        assert_eq!(TypeName::new("Circle").simple_name(), "Circle");
    }

    #[test]
    fn surrounding_whitespace_is_not_part_of_identity() {
        assert_eq!(TypeName::new(" Circle "), TypeName::new("Circle"));
    }

    #[test]
    fn lookup_by_str_key() {
        let mut map = HashMap::new();
        map.insert(TypeName::new("Circle"), 1);
        assert_eq!(map.get("Circle"), Some(&1));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&TypeName::new("Circle")).unwrap();
        assert_eq!(json, "\"Circle\"");
    }
}
