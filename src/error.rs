use std::fmt;

use thiserror::Error;

use crate::ids::PersonId;
use crate::tag::Tag;

/// Kind of entity held by the address book, used in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Person,
    Relationship,
    Event,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Person => write!(f, "person"),
            EntityKind::Relationship => write!(f, "relationship"),
            EntityKind::Event => write!(f, "event"),
        }
    }
}

/// Errors raised by the address book model.
///
/// All of these are synchronous and final: the model never retries, and
/// the aggregate is left exactly as it was before the failing call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A required argument was blank or absent.
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    /// Insert or replace collides with an existing domain-equal entry.
    #[error("{0} already exists")]
    DuplicateEntry(EntityKind),

    /// Update or remove targeted an entry that is not in the list.
    #[error("{0} not found")]
    EntryNotFound(EntityKind),

    #[error("relationship '{name}' between {first} and {second} not found")]
    RelationshipNotFound {
        first: PersonId,
        second: PersonId,
        name: String,
    },

    /// Malformed cross-reference, e.g. editing an event that is not stored.
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    #[error("tag '{0}' already present")]
    TagAlreadyPresent(Tag),

    #[error("tag '{0}' not present")]
    TagNotPresent(Tag),

    /// A field value failed validation.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Date text could not be parsed.
    #[error("invalid date '{input}' (expected YYYY-MM-DD or YYYY-MM-DD HH:MM)")]
    Parse { input: String },
}

impl ModelError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        ModelError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
