use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{EntityKind, ModelError, Result};
use crate::ids::PersonId;
use crate::tag::Tag;
use crate::unique_list::DomainIdentity;

// Validation constants
const MAX_NAME_LENGTH: usize = 256;
const MAX_FIELD_LENGTH: usize = 512;
const MIN_PHONE_DIGITS: usize = 3;
const MAX_PHONE_DIGITS: usize = 20;

/// Validate person name (non-empty, bounded, no control characters)
fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ModelError::MissingArgument("name"));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ModelError::validation(
            "name",
            format!("too long (max {} chars)", MAX_NAME_LENGTH),
        ));
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(ModelError::validation("name", "contains invalid characters"));
    }
    Ok(())
}

/// Validate phone number (digits only)
fn validate_phone(phone: &str) -> Result<()> {
    if phone.is_empty() {
        return Err(ModelError::MissingArgument("phone"));
    }
    if !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ModelError::validation("phone", "must contain digits only"));
    }
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&phone.len()) {
        return Err(ModelError::validation(
            "phone",
            format!(
                "must be {}-{} digits long",
                MIN_PHONE_DIGITS, MAX_PHONE_DIGITS
            ),
        ));
    }
    Ok(())
}

/// Validate optional free-text fields (social handle, address)
fn validate_text(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ModelError::validation(field, "cannot be blank"));
    }
    if value.len() > MAX_FIELD_LENGTH {
        return Err(ModelError::validation(
            field,
            format!("too long (max {} chars)", MAX_FIELD_LENGTH),
        ));
    }
    if value.contains('\0') {
        return Err(ModelError::validation(field, "contains null bytes"));
    }
    Ok(())
}

/// A contact in the address book.
///
/// Persons are never edited in place: an edit builds a new value via
/// [`Person::to_builder`] and replaces the stored one, so list invariants
/// are re-checked on every change.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Person {
    id: PersonId,
    name: String,
    phone: String,
    social: Option<String>,
    address: Option<String>,
    tags: BTreeSet<Tag>,
}

impl Person {
    pub fn builder(name: impl Into<String>, phone: impl Into<String>) -> PersonBuilder {
        PersonBuilder::new(name, phone)
    }

    /// Builder pre-filled with this person's fields, including the id
    pub fn to_builder(&self) -> PersonBuilder {
        PersonBuilder {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            phone: self.phone.clone(),
            social: self.social.clone(),
            address: self.address.clone(),
            tags: self.tags.iter().cloned().collect(),
        }
    }

    pub fn id(&self) -> &PersonId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn social(&self) -> Option<&str> {
        self.social.as_deref()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }

    /// Same name and same phone
    pub fn is_same_person(&self, other: &Person) -> bool {
        self.name == other.name && self.phone == other.phone
    }
}

impl DomainIdentity for Person {
    const KIND: EntityKind = EntityKind::Person;

    fn is_same(&self, other: &Self) -> bool {
        self.is_same_person(other)
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}; Phone: {}", self.name, self.phone)?;
        if let Some(social) = &self.social {
            write!(f, "; Social: {}", social)?;
        }
        if let Some(address) = &self.address {
            write!(f, "; Address: {}", address)?;
        }
        if !self.tags.is_empty() {
            write!(f, "; Tags: ")?;
            for tag in &self.tags {
                write!(f, "{}", tag)?;
            }
        }
        Ok(())
    }
}

/// Validating constructor for [`Person`]
#[derive(Debug, Clone)]
pub struct PersonBuilder {
    id: Option<PersonId>,
    name: String,
    phone: String,
    social: Option<String>,
    address: Option<String>,
    tags: Vec<Tag>,
}

impl PersonBuilder {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            phone: phone.into(),
            social: None,
            address: None,
            tags: Vec::new(),
        }
    }

    /// Use an explicit id instead of allocating one
    pub fn id(mut self, id: impl Into<PersonId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn social(mut self, social: impl Into<String>) -> Self {
        self.social = Some(social.into());
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
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

    pub fn build(self) -> Result<Person> {
        let name = self.name.trim().to_string();
        validate_name(&name)?;
        validate_phone(&self.phone)?;
        if let Some(social) = &self.social {
            validate_text(social, "social handle")?;
        }
        if let Some(address) = &self.address {
            validate_text(address, "address")?;
        }

        let id = match self.id {
            Some(id) if id.is_blank() => return Err(ModelError::MissingArgument("person id")),
            Some(id) => id,
            None => PersonId::generate(),
        };

        Ok(Person {
            id,
            name,
            phone: self.phone,
            social: self.social,
            address: self.address,
            tags: self.tags.into_iter().collect(),
        })
    }
}

/// Field used to order the person list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonSortKey {
    Name,
    Phone,
    Social,
    Address,
}

impl PersonSortKey {
    /// Case-insensitive comparison on the chosen field; persons without the
    /// field sort last
    pub fn compare(&self, a: &Person, b: &Person) -> Ordering {
        match self {
            PersonSortKey::Name => cmp_ignore_case(&a.name, &b.name),
            PersonSortKey::Phone => a.phone.cmp(&b.phone),
            PersonSortKey::Social => cmp_optional(a.social(), b.social()),
            PersonSortKey::Address => cmp_optional(a.address(), b.address()),
        }
    }
}

impl FromStr for PersonSortKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "name" => Ok(PersonSortKey::Name),
            "phone" => Ok(PersonSortKey::Phone),
            "social" => Ok(PersonSortKey::Social),
            "address" => Ok(PersonSortKey::Address),
            other => Err(ModelError::validation(
                "sort key",
                format!("unknown field '{}' (expected name, phone, social or address)", other),
            )),
        }
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn cmp_optional(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp_ignore_case(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Person {
        Person::builder("Alice Pauline", "94351253")
            .social("@alice")
            .address("123, Jurong West Ave 6")
            .tag(Tag::new("friends").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_allocates_id() {
        let a = Person::builder("Alice", "123").build().unwrap();
        let b = Person::builder("Alice", "123").build().unwrap();
        assert_ne!(a.id(), b.id());
        assert!(a.is_same_person(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_same_person_ignores_other_fields() {
        let alice = alice();
        let edited = alice
            .to_builder()
            .address("Bob street")
            .tags([Tag::new("husband").unwrap()])
            .build()
            .unwrap();
        assert!(alice.is_same_person(&edited));
        assert_eq!(alice.id(), edited.id());
        assert_ne!(alice, edited);
    }

    #[test]
    fn test_different_phone_is_different_person() {
        let alice = alice();
        let other = alice.to_builder().phone("999").build().unwrap();
        assert!(!alice.is_same_person(&other));
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(
            Person::builder("  ", "123").build(),
            Err(ModelError::MissingArgument("name"))
        );
        assert!(Person::builder("Alice", "12a").build().is_err());
        assert!(Person::builder("Alice", "12").build().is_err());
        assert!(Person::builder("A".repeat(257), "123").build().is_err());
        assert!(Person::builder("Alice\0", "123").build().is_err());
        assert!(Person::builder("Alice", "123").social(" ").build().is_err());
        assert!(Person::builder("Alice", "123").id("").build().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            alice().to_string(),
            "Alice Pauline; Phone: 94351253; Social: @alice; Address: 123, Jurong West Ave 6; Tags: [friends]"
        );
    }

    #[test]
    fn test_sort_key_compare() {
        let a = Person::builder("alice", "222").build().unwrap();
        let b = Person::builder("Bob", "111").social("@bob").build().unwrap();
        assert_eq!(PersonSortKey::Name.compare(&a, &b), Ordering::Less);
        assert_eq!(PersonSortKey::Phone.compare(&a, &b), Ordering::Greater);
        assert_eq!(PersonSortKey::Social.compare(&a, &b), Ordering::Greater);
        assert_eq!(PersonSortKey::Address.compare(&a, &b), Ordering::Equal);
    }

    #[test]
    fn test_sort_key_from_str() {
        assert_eq!("Name".parse::<PersonSortKey>(), Ok(PersonSortKey::Name));
        assert!("age".parse::<PersonSortKey>().is_err());
    }
}
