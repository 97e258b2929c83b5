use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::address_book::{AddressBook, CascadeSummary, ReadOnlyAddressBook};
use crate::error::ModelError;
use crate::event::Event;
use crate::person::{Person, PersonSortKey};
use crate::predicate::{MatchAll, Predicate};
use crate::relationship::Relationship;
use crate::storage::JsonAddressBookStorage;

/// Manager for address book operations.
///
/// Wraps the [`AddressBook`] aggregate with the current person/event
/// filters used by list views, optional JSON storage and logging of every
/// mutation. Filtered views are recomputed from the backing lists on each
/// call.
pub struct ModelManager {
    book: AddressBook,
    storage: Option<JsonAddressBookStorage>,
    person_filter: Box<dyn Predicate<Person>>,
    event_filter: Box<dyn Predicate<Event>>,
}

impl ModelManager {
    /// Manager over an existing book, without storage
    pub fn new(book: AddressBook) -> Self {
        Self {
            book,
            storage: None,
            person_filter: Box::new(MatchAll),
            event_filter: Box::new(MatchAll),
        }
    }

    /// Open (or start) the address book stored at `path`
    pub fn open(path: PathBuf) -> Result<Self> {
        let storage = JsonAddressBookStorage::new(path)?;
        let book = storage.load()?;
        info!(path = %storage.path().display(), %book, "Address book loaded");
        Ok(Self {
            storage: Some(storage),
            ..Self::new(book)
        })
    }

    /// Write the book back to storage (no-op for in-memory managers)
    pub fn save(&self) -> Result<()> {
        if let Some(storage) = &self.storage {
            storage.save(&self.book)?;
            debug!(path = %storage.path().display(), "Address book saved");
        }
        Ok(())
    }

    pub fn book(&self) -> &AddressBook {
        &self.book
    }

    /// Replace all contents (bulk import)
    pub fn reset_data(&mut self, data: &impl ReadOnlyAddressBook) -> Result<(), ModelError> {
        self.book.reset_data(data)?;
        info!(book = %self.book, "Address book reset");
        Ok(())
    }

    pub fn clear(&mut self) {
        self.book.clear();
        info!("Address book cleared");
    }

    // Persons

    pub fn has_person(&self, person: &Person) -> bool {
        self.book.has_person(person)
    }

    pub fn add_person(&mut self, person: Person) -> Result<(), ModelError> {
        let name = person.name().to_string();
        self.book.add_person(person).inspect_err(|err| {
            warn!(person = %name, error = %err, "Rejected person");
        })?;
        info!(person = %name, "Added person");
        Ok(())
    }

    pub fn set_person(&mut self, target: &Person, edited: Person) -> Result<(), ModelError> {
        let name = edited.name().to_string();
        self.book.set_person(target, edited)?;
        info!(id = %target.id(), person = %name, "Edited person");
        Ok(())
    }

    /// Remove `person`, cascading into relationships and event rosters
    pub fn delete_person(&mut self, person: &Person) -> Result<CascadeSummary, ModelError> {
        let summary = self.book.remove_person(person)?;
        info!(
            id = %person.id(),
            person = %person.name(),
            relationships_removed = summary.relationships_removed.len(),
            events_updated = summary.events_updated,
            events_merged = summary.events_merged,
            "Deleted person"
        );
        Ok(summary)
    }

    pub fn sort_persons(&mut self, key: PersonSortKey) {
        self.book.sort_persons(|a, b| key.compare(a, b));
        debug!(?key, "Sorted persons");
    }

    pub fn update_person_filter(&mut self, predicate: impl Predicate<Person> + 'static) {
        debug!(?predicate, "Person filter updated");
        self.person_filter = Box::new(predicate);
    }

    /// Persons matching the current filter, in list order
    pub fn filtered_persons(&self) -> Vec<&Person> {
        self.book.filter_persons(self.person_filter.as_ref())
    }

    /// Person at a one-based position in the filtered view
    pub fn person_at(&self, index: usize) -> Option<&Person> {
        index
            .checked_sub(1)
            .and_then(|i| self.filtered_persons().get(i).copied())
    }

    // Relationships

    pub fn has_relationship_between(&self, first: &str, second: &str, name: &str) -> Result<bool, ModelError> {
        self.book.has_relationship_between(first, second, name)
    }

    pub fn add_relationship(&mut self, relationship: Relationship) -> Result<(), ModelError> {
        let summary = relationship.to_string();
        self.book.add_relationship(relationship).inspect_err(|err| {
            warn!(relationship = %summary, error = %err, "Rejected relationship");
        })?;
        info!(relationship = %summary, "Added relationship");
        Ok(())
    }

    pub fn update_relationship(&mut self, original: &Relationship, updated: Relationship) -> Result<(), ModelError> {
        let summary = updated.to_string();
        self.book.update_relationship(original, updated)?;
        info!(relationship = %summary, "Updated relationship");
        Ok(())
    }

    pub fn delete_relationship(&mut self, first: &str, second: &str, name: &str) -> Result<Relationship, ModelError> {
        let removed = self.book.remove_relationship(first, second, name)?;
        info!(relationship = %removed, "Deleted relationship");
        Ok(removed)
    }

    // Events

    pub fn has_event(&self, event: &Event) -> bool {
        self.book.has_event(event)
    }

    pub fn add_event(&mut self, event: Event) -> Result<(), ModelError> {
        let title = event.title().to_string();
        self.book.add_event(event)?;
        info!(event = %title, "Added event");
        Ok(())
    }

    pub fn set_event(&mut self, original: &Event, edited: Event) -> Result<(), ModelError> {
        let title = edited.title().to_string();
        self.book.set_event(original, edited)?;
        info!(event = %title, "Updated event");
        Ok(())
    }

    pub fn delete_event(&mut self, event: &Event) -> Result<Event, ModelError> {
        let removed = self.book.remove_event(event)?;
        info!(event = %removed.title(), "Deleted event");
        Ok(removed)
    }

    pub fn update_event_filter(&mut self, predicate: impl Predicate<Event> + 'static) {
        debug!(?predicate, "Event filter updated");
        self.event_filter = Box::new(predicate);
    }

    pub fn filtered_events(&self) -> Vec<&Event> {
        self.book.filter_events(self.event_filter.as_ref())
    }

    /// Event at a one-based position in the filtered view
    pub fn event_at(&self, index: usize) -> Option<&Event> {
        index
            .checked_sub(1)
            .and_then(|i| self.filtered_events().get(i).copied())
    }
}

impl Default for ModelManager {
    fn default() -> Self {
        Self::new(AddressBook::new())
    }
}
