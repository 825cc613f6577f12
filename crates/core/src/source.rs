//! Registration attribution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who made a registration, e.g. `"PluginA"` or `"shapes plugin, rule addCircle"`.
///
/// Registrations come from independently authored contributors, so every
/// conflict message names the source when one was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Source(String);

impl Source {
    pub fn new(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Source {
    fn from(s: String) -> Self {
        Self(s)
    }
}
