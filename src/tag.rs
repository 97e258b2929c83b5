use std::fmt;

use crate::error::{ModelError, Result};

const MAX_TAG_LENGTH: usize = 64;

/// Label attached to persons, relationships and events
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(String);

impl Tag {
    /// Validate and create a tag (alphanumeric, dashes, underscores)
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_tag(&name)?;
        Ok(Self(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

fn validate_tag(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ModelError::validation("tag", "cannot be empty"));
    }
    if name.len() > MAX_TAG_LENGTH {
        return Err(ModelError::validation(
            "tag",
            format!("too long (max {} chars)", MAX_TAG_LENGTH),
        ));
    }
    if !name.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
        return Err(ModelError::validation(
            "tag",
            "contains invalid characters (only alphanumeric, -, _ allowed)",
        ));
    }
    Ok(())
}

/// Parse a list of raw tag names, failing on the first invalid one
pub fn parse_tags<I, S>(names: I) -> Result<Vec<Tag>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Tag::new).collect()
}
