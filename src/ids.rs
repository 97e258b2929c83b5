use std::fmt;

use uuid::Uuid;

/// Stable identifier of a person.
///
/// Opaque string so that ids loaded from a data file (which may be short
/// numeric strings) and freshly allocated ids share one type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonId(String);

impl PersonId {
    /// Wrap an existing identifier (import paths, tests, relationship endpoints)
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Allocate a new identifier, unique for the process lifetime
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PersonId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for PersonId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
