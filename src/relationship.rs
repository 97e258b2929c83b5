use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{EntityKind, ModelError, Result};
use crate::ids::PersonId;
use crate::tag::Tag;
use crate::unique_list::DomainIdentity;

const MAX_RELATIONSHIP_NAME_LENGTH: usize = 128;

/// Unordered endpoint pair, stored sorted so that (A, B) and (B, A) share
/// one key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    low: PersonId,
    high: PersonId,
}

impl PairKey {
    pub fn new(a: PersonId, b: PersonId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Key for a borrowed pair without keeping the inputs
    pub fn of(a: &PersonId, b: &PersonId) -> Self {
        Self::new(a.clone(), b.clone())
    }

    pub fn low(&self) -> &PersonId {
        &self.low
    }

    pub fn high(&self) -> &PersonId {
        &self.high
    }

    pub fn contains(&self, id: &PersonId) -> bool {
        &self.low == id || &self.high == id
    }
}

/// Relationship between two persons.
///
/// `forward_name` reads from `user1` to `user2` ("Alice is Bob's *mentor*"),
/// `reverse_name` from `user2` back to `user1`. Equality and hashing go
/// through the normalized [`PairKey`], so a relationship written in either
/// direction compares equal to its mirror image.
#[derive(Debug, Clone)]
pub struct Relationship {
    user1_id: PersonId,
    user2_id: PersonId,
    forward_name: String,
    reverse_name: String,
    tags: BTreeSet<Tag>,
    key: PairKey,
}

impl Relationship {
    pub fn builder() -> RelationshipBuilder {
        RelationshipBuilder::default()
    }

    /// Builder pre-filled with this relationship, for edits
    pub fn to_builder(&self) -> RelationshipBuilder {
        RelationshipBuilder {
            user1_id: Some(self.user1_id.clone()),
            user2_id: Some(self.user2_id.clone()),
            forward_name: Some(self.forward_name.clone()),
            reverse_name: Some(self.reverse_name.clone()),
            tags: self.tags.iter().cloned().collect(),
        }
    }

    pub fn user1_id(&self) -> &PersonId {
        &self.user1_id
    }

    pub fn user2_id(&self) -> &PersonId {
        &self.user2_id
    }

    pub fn forward_name(&self) -> &str {
        &self.forward_name
    }

    pub fn reverse_name(&self) -> &str {
        &self.reverse_name
    }

    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }

    pub fn key(&self) -> &PairKey {
        &self.key
    }

    pub fn involves(&self, id: &PersonId) -> bool {
        self.key.contains(id)
    }

    /// Whether `name` is either the forward or the reverse name
    pub fn has_name(&self, name: &str) -> bool {
        self.forward_name == name || self.reverse_name == name
    }

    /// Name of the relationship as read starting from `from`
    pub fn name_from(&self, from: &PersonId) -> Option<&str> {
        if from == &self.user1_id {
            Some(&self.forward_name)
        } else if from == &self.user2_id {
            Some(&self.reverse_name)
        } else {
            None
        }
    }

    /// The other endpoint, if `id` is one of the two
    pub fn other_end(&self, id: &PersonId) -> Option<&PersonId> {
        if id == &self.user1_id {
            Some(&self.user2_id)
        } else if id == &self.user2_id {
            Some(&self.user1_id)
        } else {
            None
        }
    }

    /// Names as read from the low end of the pair key
    fn oriented_names(&self) -> (&str, &str) {
        if self.user1_id == self.key.low {
            (&self.forward_name, &self.reverse_name)
        } else {
            (&self.reverse_name, &self.forward_name)
        }
    }
}

impl PartialEq for Relationship {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.oriented_names() == other.oriented_names()
            && self.tags == other.tags
    }
}

impl Eq for Relationship {}

impl Hash for Relationship {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.oriented_names().hash(state);
        self.tags.hash(state);
    }
}

impl DomainIdentity for Relationship {
    const KIND: EntityKind = EntityKind::Relationship;

    /// At most one relationship per unordered pair
    fn is_same(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}: {} / {}",
            self.user1_id, self.user2_id, self.forward_name, self.reverse_name
        )?;
        if !self.tags.is_empty() {
            write!(f, "; Tags: ")?;
            for tag in &self.tags {
                write!(f, "{}", tag)?;
            }
        }
        Ok(())
    }
}

fn validate_relationship_name(name: &str, field: &'static str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ModelError::MissingArgument(field));
    }
    if name.len() > MAX_RELATIONSHIP_NAME_LENGTH {
        return Err(ModelError::validation(
            field,
            format!("too long (max {} chars)", MAX_RELATIONSHIP_NAME_LENGTH),
        ));
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(ModelError::validation(field, "contains invalid characters"));
    }
    Ok(())
}

/// Validating constructor for [`Relationship`].
///
/// Both endpoints and the forward name are required; the reverse name
/// defaults to the forward name (symmetric relationships such as "Friend").
#[derive(Debug, Clone, Default)]
pub struct RelationshipBuilder {
    user1_id: Option<PersonId>,
    user2_id: Option<PersonId>,
    forward_name: Option<String>,
    reverse_name: Option<String>,
    tags: Vec<Tag>,
}

impl RelationshipBuilder {
    pub fn user1(mut self, id: impl Into<PersonId>) -> Self {
        self.user1_id = Some(id.into());
        self
    }

    pub fn user2(mut self, id: impl Into<PersonId>) -> Self {
        self.user2_id = Some(id.into());
        self
    }

    pub fn forward_name(mut self, name: impl Into<String>) -> Self {
        self.forward_name = Some(name.into());
        self
    }

    pub fn reverse_name(mut self, name: impl Into<String>) -> Self {
        self.reverse_name = Some(name.into());
        self
    }

    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Replace all tags
    pub fn tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    pub fn build(self) -> Result<Relationship> {
        let user1_id = self
            .user1_id
            .filter(|id| !id.is_blank())
            .ok_or(ModelError::MissingArgument("first person id"))?;
        let user2_id = self
            .user2_id
            .filter(|id| !id.is_blank())
            .ok_or(ModelError::MissingArgument("second person id"))?;
        if user1_id == user2_id {
            return Err(ModelError::IllegalArgument(format!(
                "a person cannot be related to themselves ({})",
                user1_id
            )));
        }

        let forward_name = self
            .forward_name
            .map(|name| name.trim().to_string())
            .unwrap_or_default();
        validate_relationship_name(&forward_name, "relationship name")?;
        let reverse_name = match self.reverse_name {
            Some(name) => {
                let name = name.trim().to_string();
                validate_relationship_name(&name, "reverse relationship name")?;
                name
            }
            None => forward_name.clone(),
        };

        let key = PairKey::of(&user1_id, &user2_id);
        Ok(Relationship {
            user1_id,
            user2_id,
            forward_name,
            reverse_name,
            tags: self.tags.into_iter().collect(),
            key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mentor(a: &str, b: &str) -> Relationship {
        Relationship::builder()
            .user1(a)
            .user2(b)
            .forward_name("Mentor")
            .reverse_name("Mentee")
            .build()
            .unwrap()
    }

    #[test]
    fn test_pair_key_is_order_independent() {
        assert_eq!(
            PairKey::new("a".into(), "b".into()),
            PairKey::new("b".into(), "a".into())
        );
    }

    #[test]
    fn test_mirror_image_is_equal() {
        let forward = mentor("1", "2");
        let mirrored = Relationship::builder()
            .user1("2")
            .user2("1")
            .forward_name("Mentee")
            .reverse_name("Mentor")
            .build()
            .unwrap();
        assert_eq!(forward, mirrored);
    }

    #[test]
    fn test_same_pair_different_direction_is_not_equal() {
        // Same names but swapped endpoints means the roles are swapped
        assert_ne!(mentor("1", "2"), mentor("2", "1"));
        assert!(mentor("1", "2").is_same(&mentor("2", "1")));
    }

    #[test]
    fn test_reverse_name_defaults_to_forward() {
        let friend = Relationship::builder()
            .user1("1")
            .user2("2")
            .forward_name("Friend")
            .build()
            .unwrap();
        assert_eq!(friend.reverse_name(), "Friend");
    }

    #[test]
    fn test_name_from_each_end() {
        let rel = mentor("1", "2");
        assert_eq!(rel.name_from(&"1".into()), Some("Mentor"));
        assert_eq!(rel.name_from(&"2".into()), Some("Mentee"));
        assert_eq!(rel.name_from(&"3".into()), None);
        assert_eq!(rel.other_end(&"2".into()), Some(&PersonId::new("1")));
    }

    #[test]
    fn test_builder_requires_endpoints_and_name() {
        assert_eq!(
            Relationship::builder().user2("2").forward_name("Friend").build(),
            Err(ModelError::MissingArgument("first person id"))
        );
        assert_eq!(
            Relationship::builder().user1("1").forward_name("Friend").build(),
            Err(ModelError::MissingArgument("second person id"))
        );
        assert_eq!(
            Relationship::builder().user1("1").user2("2").build(),
            Err(ModelError::MissingArgument("relationship name"))
        );
    }

    #[test]
    fn test_builder_rejects_self_relationship() {
        let result = Relationship::builder()
            .user1("1")
            .user2("1")
            .forward_name("Friend")
            .build();
        assert!(matches!(result, Err(ModelError::IllegalArgument(_))));
    }

    #[test]
    fn test_tags_take_part_in_equality() {
        let plain = mentor("1", "2");
        let tagged = plain.to_builder().tag(Tag::new("work").unwrap()).build().unwrap();
        assert_ne!(plain, tagged);
        assert!(plain.is_same(&tagged));
    }
}
