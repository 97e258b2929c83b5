use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDateTime;

use crate::date::{format_date, truncate_to_minute};
use crate::error::{EntityKind, ModelError, Result};
use crate::ids::PersonId;
use crate::person::Person;
use crate::tag::Tag;
use crate::unique_list::{DomainIdentity, UniqueEntityList};

const MAX_TITLE_LENGTH: usize = 256;
const MAX_TEXT_LENGTH: usize = 4096;

/// A dated event with a roster of contacts.
///
/// Events are values: every change (tags, contacts) returns a new `Event`
/// and the stored copy is swapped through `AddressBook::set_event`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Event {
    title: String,
    date: NaiveDateTime,
    location: Option<String>,
    description: Option<String>,
    tags: BTreeSet<Tag>,
    contacts: UniqueEntityList<Person>,
}

impl Event {
    pub fn builder(title: impl Into<String>, date: NaiveDateTime) -> EventBuilder {
        EventBuilder::new(title, date)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn date(&self) -> &NaiveDateTime {
        &self.date
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }

    pub fn contacts(&self) -> &[Person] {
        self.contacts.as_slice()
    }

    pub fn contact_list(&self) -> &UniqueEntityList<Person> {
        &self.contacts
    }

    /// Roster membership by domain equality
    pub fn has_contact(&self, person: &Person) -> bool {
        self.contacts.contains(person)
    }

    pub fn has_contact_id(&self, id: &PersonId) -> bool {
        self.contacts.iter().any(|contact| contact.id() == id)
    }

    /// Copy of this event with `person` appended to the roster
    pub fn with_contact(&self, person: Person) -> Result<Event> {
        let mut updated = self.clone();
        updated.contacts.add(person)?;
        Ok(updated)
    }

    /// Copy of this event without `person` (matched by id or domain
    /// equality). Removing an absent contact is a no-op.
    pub fn without_contact(&self, person: &Person) -> Event {
        let mut updated = self.clone();
        updated
            .contacts
            .retain(|contact| contact.id() != person.id() && !contact.is_same_person(person));
        updated
    }

    /// Copy of this event with the roster entry for `target.id()` replaced
    pub fn with_replaced_contact(&self, target: &Person, edited: Person) -> Result<Event> {
        let stale = self
            .contacts
            .iter()
            .find(|contact| contact.id() == target.id())
            .cloned()
            .ok_or(ModelError::EntryNotFound(EntityKind::Person))?;
        let mut updated = self.clone();
        updated.contacts.set_item(&stale, edited)?;
        Ok(updated)
    }

    /// Copy of this event with `tag` added; fails if already tagged
    pub fn with_added_tag(&self, tag: Tag) -> Result<Event> {
        if self.tags.contains(&tag) {
            return Err(ModelError::TagAlreadyPresent(tag));
        }
        let mut updated = self.clone();
        updated.tags.insert(tag);
        Ok(updated)
    }

    pub fn without_tag(&self, tag: &Tag) -> Result<Event> {
        if !self.tags.contains(tag) {
            return Err(ModelError::TagNotPresent(tag.clone()));
        }
        let mut updated = self.clone();
        updated.tags.remove(tag);
        Ok(updated)
    }
}

impl DomainIdentity for Event {
    const KIND: EntityKind = EntityKind::Event;

    fn is_same(&self, other: &Self) -> bool {
        self == other
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}; Date: {}", self.title, format_date(&self.date))?;
        if let Some(location) = &self.location {
            write!(f, "; Location: {}", location)?;
        }
        if let Some(description) = &self.description {
            write!(f, "; Description: {}", description)?;
        }
        if !self.tags.is_empty() {
            write!(f, "; Tags: ")?;
            for tag in &self.tags {
                write!(f, "{}", tag)?;
            }
        }
        if !self.contacts.is_empty() {
            let names: Vec<&str> = self.contacts.iter().map(Person::name).collect();
            write!(f, "; Contacts: {}", names.join(", "))?;
        }
        Ok(())
    }
}

fn validate_optional_text(value: &Option<String>, field: &'static str) -> Result<()> {
    if let Some(text) = value {
        if text.len() > MAX_TEXT_LENGTH {
            return Err(ModelError::validation(
                field,
                format!("too long (max {} chars)", MAX_TEXT_LENGTH),
            ));
        }
        if text.contains('\0') {
            return Err(ModelError::validation(field, "contains null bytes"));
        }
    }
    Ok(())
}

/// Validating constructor for [`Event`]
#[derive(Debug, Clone)]
pub struct EventBuilder {
    title: String,
    date: NaiveDateTime,
    location: Option<String>,
    description: Option<String>,
    tags: Vec<Tag>,
    contacts: Vec<Person>,
}

impl EventBuilder {
    pub fn new(title: impl Into<String>, date: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            date,
            location: None,
            description: None,
            tags: Vec::new(),
            contacts: Vec::new(),
        }
    }

    /// Blank text is treated as "no location"
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = non_blank(location.into());
        self
    }

    /// Blank text is treated as "no description"
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = non_blank(description.into());
        self
    }

    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    pub fn contact(mut self, person: Person) -> Self {
        self.contacts.push(person);
        self
    }

    pub fn contacts(mut self, persons: impl IntoIterator<Item = Person>) -> Self {
        self.contacts = persons.into_iter().collect();
        self
    }

    pub fn build(self) -> Result<Event> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ModelError::MissingArgument("event title"));
        }
        if title.len() > MAX_TITLE_LENGTH {
            return Err(ModelError::validation(
                "event title",
                format!("too long (max {} chars)", MAX_TITLE_LENGTH),
            ));
        }
        validate_optional_text(&self.location, "location")?;
        validate_optional_text(&self.description, "description")?;

        let mut tags = BTreeSet::new();
        for tag in self.tags {
            if !tags.insert(tag.clone()) {
                return Err(ModelError::TagAlreadyPresent(tag));
            }
        }

        Ok(Event {
            title,
            date: truncate_to_minute(self.date),
            location: self.location,
            description: self.description,
            tags,
            contacts: UniqueEntityList::from_vec(self.contacts)?,
        })
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::parse_date;

    fn budget_meeting() -> Event {
        Event::builder("Budget Meeting", parse_date("2025-01-01 10:00").unwrap())
            .location("Room B")
            .description("Discuss budget")
            .build()
            .unwrap()
    }

    fn person(name: &str, phone: &str) -> Person {
        Person::builder(name, phone).build().unwrap()
    }

    #[test]
    fn test_with_added_tag_returns_union() {
        let event = budget_meeting();
        let finance = Tag::new("Finance").unwrap();
        let tagged = event.with_added_tag(finance.clone()).unwrap();

        assert!(event.tags().is_empty());
        assert_eq!(tagged.tags().len(), 1);
        assert!(tagged.tags().contains(&finance));
        assert_eq!(tagged.title(), event.title());
    }

    #[test]
    fn test_with_added_tag_twice_fails() {
        let finance = Tag::new("Finance").unwrap();
        let tagged = budget_meeting().with_added_tag(finance.clone()).unwrap();
        assert_eq!(
            tagged.with_added_tag(finance.clone()),
            Err(ModelError::TagAlreadyPresent(finance))
        );
    }

    #[test]
    fn test_without_tag() {
        let finance = Tag::new("Finance").unwrap();
        let event = budget_meeting();
        assert!(event.without_tag(&finance).is_err());
        let tagged = event.with_added_tag(finance.clone()).unwrap();
        assert_eq!(tagged.without_tag(&finance).unwrap(), event);
    }

    #[test]
    fn test_duplicate_contact_rejected() {
        let alice = person("Alice", "111");
        let event = budget_meeting().with_contact(alice.clone()).unwrap();
        let same_alice = alice.to_builder().address("elsewhere").build().unwrap();
        assert_eq!(
            event.with_contact(same_alice),
            Err(ModelError::DuplicateEntry(EntityKind::Person))
        );
    }

    #[test]
    fn test_without_contact_is_value_operation() {
        let alice = person("Alice", "111");
        let bob = person("Bob", "222");
        let event = budget_meeting()
            .with_contact(alice.clone())
            .unwrap()
            .with_contact(bob.clone())
            .unwrap();

        let stripped = event.without_contact(&alice);
        assert!(event.has_contact(&alice));
        assert!(!stripped.has_contact(&alice));
        assert!(!stripped.has_contact_id(alice.id()));
        assert_eq!(stripped.contacts(), &[bob]);
    }

    #[test]
    fn test_with_replaced_contact() {
        let alice = person("Alice", "111");
        let event = budget_meeting().with_contact(alice.clone()).unwrap();
        let renamed = alice.to_builder().name("Alicia").build().unwrap();

        let updated = event.with_replaced_contact(&alice, renamed.clone()).unwrap();
        assert_eq!(updated.contacts(), &[renamed]);
    }

    #[test]
    fn test_builder_validation() {
        let date = parse_date("2024-01-01").unwrap();
        assert_eq!(
            Event::builder(" ", date).build(),
            Err(ModelError::MissingArgument("event title"))
        );
        let alice = person("Alice", "111");
        assert!(Event::builder("Meeting", date)
            .contact(alice.clone())
            .contact(alice)
            .build()
            .is_err());
        let event = Event::builder("Meeting", date).location("  ").build().unwrap();
        assert_eq!(event.location(), None);
    }

    #[test]
    fn test_display() {
        let event = budget_meeting()
            .with_added_tag(Tag::new("Finance").unwrap())
            .unwrap()
            .with_contact(person("Alice", "111"))
            .unwrap();
        assert_eq!(
            event.to_string(),
            "Budget Meeting; Date: 2025-01-01 10:00; Location: Room B; Description: Discuss budget; Tags: [Finance]; Contacts: Alice"
        );
    }
}
