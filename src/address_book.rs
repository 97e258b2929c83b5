use std::cmp::Ordering;
use std::fmt;

use crate::error::{EntityKind, ModelError, Result};
use crate::event::Event;
use crate::ids::PersonId;
use crate::person::Person;
use crate::predicate::Predicate;
use crate::relationship::{PairKey, Relationship};
use crate::unique_list::UniqueEntityList;

/// Read-only view of an address book: the sole ingress for bulk-loaded
/// state and the sole egress for serialization
pub trait ReadOnlyAddressBook {
    fn persons(&self) -> &[Person];
    fn relationships(&self) -> &[Relationship];
    fn events(&self) -> &[Event];
}

/// Plain, unvalidated collections (e.g. decoded from a data file)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressBookData {
    pub persons: Vec<Person>,
    pub relationships: Vec<Relationship>,
    pub events: Vec<Event>,
}

impl ReadOnlyAddressBook for AddressBookData {
    fn persons(&self) -> &[Person] {
        &self.persons
    }

    fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    fn events(&self) -> &[Event] {
        &self.events
    }
}

/// What a person removal cascaded into
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    /// Relationships deleted because the person was an endpoint
    pub relationships_removed: Vec<Relationship>,
    /// Events kept with the person stripped from their roster
    pub events_updated: usize,
    /// Events dropped because stripping made them equal to another event
    pub events_merged: usize,
}

/// Persons, relationships and events kept mutually consistent.
///
/// # Invariants
/// - No two persons are the same person (name + phone).
/// - At most one relationship per unordered pair of ids.
/// - No two events are equal.
/// - Removing a person deletes every relationship it is an endpoint of and
///   strips it from every event roster; events themselves are kept.
///
/// Every operation either succeeds completely or leaves the book untouched.
/// Equality and hashing cover the three lists only.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct AddressBook {
    persons: UniqueEntityList<Person>,
    relationships: UniqueEntityList<Relationship>,
    events: UniqueEntityList<Event>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from `data`, validating every collection
    pub fn from_data(data: &impl ReadOnlyAddressBook) -> Result<Self> {
        let mut book = Self::new();
        book.reset_data(data)?;
        Ok(book)
    }

    /// Replace all contents with `new_data`.
    ///
    /// Fails with `DuplicateEntry` if any incoming collection has internal
    /// duplicates; nothing is replaced in that case.
    pub fn reset_data(&mut self, new_data: &impl ReadOnlyAddressBook) -> Result<()> {
        let persons = UniqueEntityList::from_vec(new_data.persons().to_vec())?;
        let relationships = UniqueEntityList::from_vec(new_data.relationships().to_vec())?;
        let events = UniqueEntityList::from_vec(new_data.events().to_vec())?;
        for event in &events {
            check_roster(&persons, event)?;
        }

        self.persons = persons;
        self.relationships = relationships;
        self.events = events;
        Ok(())
    }

    // Persons

    /// Bulk replace; fails if a stored event would keep a contact that is
    /// not in `persons`
    pub fn set_persons(&mut self, persons: Vec<Person>) -> Result<()> {
        let persons = UniqueEntityList::from_vec(persons)?;
        for event in &self.events {
            check_roster(&persons, event)?;
        }
        self.persons = persons;
        Ok(())
    }

    /// Whether a person with the same identity fields exists
    pub fn has_person(&self, person: &Person) -> bool {
        self.persons.contains(person)
    }

    /// Lookup by id; absence is not an error
    pub fn get_person_by_id(&self, id: &str) -> Option<&Person> {
        self.persons.iter().find(|person| person.id().as_str() == id)
    }

    pub fn add_person(&mut self, person: Person) -> Result<()> {
        self.persons.add(person)
    }

    /// Replace `target` with `edited`, refreshing every event roster that
    /// holds `target`
    pub fn set_person(&mut self, target: &Person, edited: Person) -> Result<()> {
        let mut persons = self.persons.clone();
        persons.set_item(target, edited.clone())?;

        let mut events = self.events.clone();
        for event in self.events.iter().filter(|e| e.has_contact_id(target.id())) {
            let refreshed = event.with_replaced_contact(target, edited.clone())?;
            events.set_item(event, refreshed)?;
        }

        self.persons = persons;
        self.events = events;
        Ok(())
    }

    /// Remove `person` and cascade into relationships and event rosters
    pub fn remove_person(&mut self, person: &Person) -> Result<CascadeSummary> {
        let mut persons = self.persons.clone();
        let removed = persons.remove(person)?;

        let mut relationships = self.relationships.clone();
        let relationships_removed = relationships.retain(|rel| !rel.involves(removed.id()));

        let mut events = self.events.clone();
        let mut events_updated = 0;
        let mut events_merged = 0;
        for event in self
            .events
            .iter()
            .filter(|event| event.has_contact_id(removed.id()) || event.has_contact(&removed))
        {
            let stripped = event.without_contact(&removed);
            // Stripping a contact can make two events equal; keep one copy
            if events.contains(&stripped) {
                events.remove(event)?;
                events_merged += 1;
            } else {
                events.set_item(event, stripped)?;
                events_updated += 1;
            }
        }

        self.persons = persons;
        self.relationships = relationships;
        self.events = events;
        Ok(CascadeSummary {
            relationships_removed,
            events_updated,
            events_merged,
        })
    }

    /// Stable in-place sort of the person list
    pub fn sort_persons<F>(&mut self, compare: F)
    where
        F: FnMut(&Person, &Person) -> Ordering,
    {
        self.persons.sort_by(compare);
    }

    pub fn persons(&self) -> &[Person] {
        self.persons.as_slice()
    }

    /// Fresh snapshot of the persons matching `predicate`
    pub fn filter_persons<P>(&self, predicate: &P) -> Vec<&Person>
    where
        P: Predicate<Person> + ?Sized,
    {
        self.persons.iter().filter(|p| predicate.test(p)).collect()
    }

    // Relationships

    /// Whether this exact relationship (in either orientation) exists
    pub fn has_relationship(&self, relationship: &Relationship) -> bool {
        self.relationships.iter().any(|rel| rel == relationship)
    }

    /// Whether `first` and `second` are related under `name`, in either
    /// order and under either the forward or reverse name
    pub fn has_relationship_between(&self, first: &str, second: &str, name: &str) -> Result<bool> {
        let (key, name) = relationship_query(first, second, name)?;
        Ok(self.find_relationship(&key, name).is_some())
    }

    pub fn add_relationship(&mut self, relationship: Relationship) -> Result<()> {
        self.relationships.add(relationship)
    }

    /// Remove the relationship named `name` between the two ids (any order)
    pub fn remove_relationship(&mut self, first: &str, second: &str, name: &str) -> Result<Relationship> {
        let (key, name) = relationship_query(first, second, name)?;
        let found = self
            .find_relationship(&key, name)
            .cloned()
            .ok_or_else(|| ModelError::RelationshipNotFound {
                first: PersonId::new(first),
                second: PersonId::new(second),
                name: name.to_string(),
            })?;
        self.relationships.remove(&found)
    }

    /// Replace `original` with `updated` (rename or retag).
    ///
    /// Endpoints are fixed: an `updated` value for a different pair fails with
    /// `IllegalArgument`. Remove and add to move a relationship.
    pub fn update_relationship(&mut self, original: &Relationship, updated: Relationship) -> Result<()> {
        if updated.key() != original.key() {
            return Err(ModelError::IllegalArgument(format!(
                "relationship endpoints cannot change ({} and {})",
                original.key().low(),
                original.key().high()
            )));
        }
        self.relationships.set_item(original, updated)
    }

    /// Bulk replace, rejecting the whole batch on any pair collision
    pub fn set_relationships(&mut self, relationships: Vec<Relationship>) -> Result<()> {
        self.relationships.set_all(relationships)
    }

    pub fn relationships(&self) -> &[Relationship] {
        self.relationships.as_slice()
    }

    /// Relationships with `id` as one endpoint
    pub fn relationships_of<'a>(&'a self, id: &'a PersonId) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships.iter().filter(move |rel| rel.involves(id))
    }

    fn find_relationship(&self, key: &PairKey, name: &str) -> Option<&Relationship> {
        self.relationships
            .iter()
            .find(|rel| rel.key() == key && rel.has_name(name))
    }

    // Events

    pub fn has_event(&self, event: &Event) -> bool {
        self.events.contains(event)
    }

    /// Add `event`; every contact must be a person stored in this book
    pub fn add_event(&mut self, event: Event) -> Result<()> {
        check_roster(&self.persons, &event)?;
        self.events.add(event)
    }

    /// Replace `original` with `edited`.
    ///
    /// An `original` that is not stored is a caller error and is reported as
    /// `IllegalArgument` rather than `EntryNotFound`.
    pub fn set_event(&mut self, original: &Event, edited: Event) -> Result<()> {
        check_roster(&self.persons, &edited)?;
        self.events.set_item(original, edited).map_err(|err| match err {
            ModelError::EntryNotFound(EntityKind::Event) => {
                ModelError::IllegalArgument(format!("event '{}' is not in the address book", original.title()))
            }
            other => other,
        })
    }

    pub fn remove_event(&mut self, event: &Event) -> Result<Event> {
        self.events.remove(event)
    }

    pub fn set_events(&mut self, events: Vec<Event>) -> Result<()> {
        for event in &events {
            check_roster(&self.persons, event)?;
        }
        self.events.set_all(events)
    }

    pub fn events(&self) -> &[Event] {
        self.events.as_slice()
    }

    /// Events whose roster includes `id`
    pub fn events_with_contact<'a>(&'a self, id: &'a PersonId) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |event| event.has_contact_id(id))
    }

    /// Fresh snapshot of the events matching `predicate`
    pub fn filter_events<P>(&self, predicate: &P) -> Vec<&Event>
    where
        P: Predicate<Event> + ?Sized,
    {
        self.events.iter().filter(|e| predicate.test(e)).collect()
    }

    /// Drop all contents
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl ReadOnlyAddressBook for AddressBook {
    fn persons(&self) -> &[Person] {
        self.persons.as_slice()
    }

    fn relationships(&self) -> &[Relationship] {
        self.relationships.as_slice()
    }

    fn events(&self) -> &[Event] {
        self.events.as_slice()
    }
}

impl fmt::Debug for AddressBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressBook")
            .field("persons", &self.persons)
            .field("relationships", &self.relationships)
            .field("events", &self.events)
            .finish()
    }
}

impl fmt::Display for AddressBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} persons, {} relationships, {} events",
            self.persons.len(),
            self.relationships.len(),
            self.events.len()
        )
    }
}

/// Every roster entry must be one of `persons`, field for field
fn check_roster(persons: &UniqueEntityList<Person>, event: &Event) -> Result<()> {
    match event
        .contacts()
        .iter()
        .find(|contact| !persons.iter().any(|person| person == *contact))
    {
        Some(stray) => Err(ModelError::IllegalArgument(format!(
            "contact '{}' of event '{}' is not in the address book",
            stray.name(),
            event.title()
        ))),
        None => Ok(()),
    }
}

/// Validate the (id, id, name) triple and normalize the pair
fn relationship_query<'n>(first: &str, second: &str, name: &'n str) -> Result<(PairKey, &'n str)> {
    if first.trim().is_empty() {
        return Err(ModelError::MissingArgument("first person id"));
    }
    if second.trim().is_empty() {
        return Err(ModelError::MissingArgument("second person id"));
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(ModelError::MissingArgument("relationship name"));
    }
    Ok((PairKey::new(PersonId::new(first), PersonId::new(second)), name))
}
