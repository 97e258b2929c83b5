//! Discrete commands over the model and their user-facing results.

use thiserror::Error;

use crate::error::{EntityKind, ModelError};
use crate::event::Event;
use crate::ids::PersonId;
use crate::manager::ModelManager;
use crate::person::{Person, PersonSortKey};
use crate::predicate::{EventKeywordPredicate, MatchAll, PersonKeywordPredicate};
use crate::relationship::Relationship;
use crate::tag::Tag;

/// Errors surfaced to the user when a command cannot run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("The {kind} index provided is invalid: {index}")]
    InvalidIndex { kind: EntityKind, index: usize },

    #[error("This {0} already exists in the address book")]
    Duplicate(EntityKind),

    #[error("The {0} was not found in the address book")]
    NotFound(EntityKind),

    #[error("No '{name}' relationship exists between {first} and {second}")]
    RelationshipNotFound {
        first: String,
        second: String,
        name: String,
    },

    #[error("No person with id {0} exists in the address book")]
    UnknownPerson(String),

    #[error("Event already has the tag {0}")]
    TagAlreadyPresent(Tag),

    #[error("{person} is already a contact of '{event}'")]
    AlreadyContact { person: String, event: String },

    #[error("At least one field to edit must be provided")]
    NothingToEdit,

    #[error("{0}")]
    Invalid(String),
}

impl From<ModelError> for CommandError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::DuplicateEntry(kind) => CommandError::Duplicate(kind),
            ModelError::EntryNotFound(kind) => CommandError::NotFound(kind),
            ModelError::RelationshipNotFound {
                first,
                second,
                name,
            } => CommandError::RelationshipNotFound {
                first: first.to_string(),
                second: second.to_string(),
                name,
            },
            ModelError::TagAlreadyPresent(tag) => CommandError::TagAlreadyPresent(tag),
            other => CommandError::Invalid(other.to_string()),
        }
    }
}

/// Outcome of a successful command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandResult {
    /// One-line summary for the user
    pub feedback: String,
    /// Rendered list view, for commands that display entries
    pub lines: Vec<String>,
    /// Whether the book changed and should be saved
    pub modified: bool,
}

impl CommandResult {
    fn changed(feedback: impl Into<String>) -> Self {
        Self {
            feedback: feedback.into(),
            lines: Vec::new(),
            modified: true,
        }
    }

    fn listing(feedback: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            feedback: feedback.into(),
            lines,
            modified: false,
        }
    }
}

/// Fields to replace when editing a person; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditPersonDescriptor {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub social: Option<String>,
    pub address: Option<String>,
    pub tags: Option<Vec<Tag>>,
}

impl EditPersonDescriptor {
    pub fn is_any_field_edited(&self) -> bool {
        self.name.is_some()
            || self.phone.is_some()
            || self.social.is_some()
            || self.address.is_some()
            || self.tags.is_some()
    }

    /// New person value with the edits applied; the id is kept
    pub fn apply(&self, person: &Person) -> Result<Person, ModelError> {
        let mut builder = person.to_builder();
        if let Some(name) = &self.name {
            builder = builder.name(name);
        }
        if let Some(phone) = &self.phone {
            builder = builder.phone(phone);
        }
        if let Some(social) = &self.social {
            builder = builder.social(social);
        }
        if let Some(address) = &self.address {
            builder = builder.address(address);
        }
        if let Some(tags) = &self.tags {
            builder = builder.tags(tags.iter().cloned());
        }
        builder.build()
    }
}

/// A single user action against the address book.
///
/// Indexes are one-based positions in the current filtered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddPerson(Person),
    EditPerson {
        index: usize,
        edit: EditPersonDescriptor,
    },
    DeletePerson {
        index: usize,
    },
    ListPersons,
    FindPersons(PersonKeywordPredicate),
    SortPersons(PersonSortKey),
    AddRelationship(Relationship),
    DeleteRelationship {
        first: String,
        second: String,
        name: String,
    },
    /// All relationships, or those of the person at `index`
    ListRelationships {
        index: Option<usize>,
    },
    AddEvent(Event),
    DeleteEvent {
        index: usize,
    },
    ListEvents,
    FindEvents(EventKeywordPredicate),
    TagEvent {
        index: usize,
        tag: Tag,
    },
    AddContactToEvent {
        event_index: usize,
        person_index: usize,
    },
    Clear,
}

impl Command {
    pub fn execute(&self, model: &mut ModelManager) -> Result<CommandResult, CommandError> {
        match self {
            Command::AddPerson(person) => {
                model.add_person(person.clone())?;
                Ok(CommandResult::changed(format!("New person added: {}", person)))
            }
            Command::EditPerson { index, edit } => {
                if !edit.is_any_field_edited() {
                    return Err(CommandError::NothingToEdit);
                }
                let target = person_at(model, *index)?;
                let edited = edit.apply(&target)?;
                model.set_person(&target, edited.clone())?;
                Ok(CommandResult::changed(format!("Edited person: {}", edited)))
            }
            Command::DeletePerson { index } => {
                let target = person_at(model, *index)?;
                let summary = model.delete_person(&target)?;
                let mut feedback = format!(
                    "Deleted person: {} ({} relationships removed, {} events updated",
                    target,
                    summary.relationships_removed.len(),
                    summary.events_updated
                );
                if summary.events_merged > 0 {
                    feedback.push_str(&format!(", {} events merged", summary.events_merged));
                }
                feedback.push(')');
                Ok(CommandResult::changed(feedback))
            }
            Command::ListPersons => {
                model.update_person_filter(MatchAll);
                Ok(list_persons(model, "Listed all persons"))
            }
            Command::FindPersons(predicate) => {
                model.update_person_filter(predicate.clone());
                let count = model.filtered_persons().len();
                Ok(list_persons(model, &format!("{} persons listed", count)))
            }
            Command::SortPersons(key) => {
                model.sort_persons(*key);
                let feedback = format!("Sorted persons by {}", format!("{:?}", key).to_lowercase());
                let mut result = list_persons(model, &feedback);
                result.modified = true;
                Ok(result)
            }
            Command::AddRelationship(relationship) => {
                for id in [relationship.user1_id(), relationship.user2_id()] {
                    if model.book().get_person_by_id(id.as_str()).is_none() {
                        return Err(CommandError::UnknownPerson(id.to_string()));
                    }
                }
                model.add_relationship(relationship.clone())?;
                Ok(CommandResult::changed(format!(
                    "New relationship added: {}",
                    relationship
                )))
            }
            Command::DeleteRelationship {
                first,
                second,
                name,
            } => {
                let removed = model.delete_relationship(first, second, name)?;
                Ok(CommandResult::changed(format!("Deleted relationship: {}", removed)))
            }
            Command::ListRelationships { index } => {
                let model: &ModelManager = model;
                let lines: Vec<String> = match index {
                    Some(index) => {
                        let person = person_at(model, *index)?;
                        model
                            .book()
                            .relationships_of(person.id())
                            .map(|rel| describe_from(model, rel, &person))
                            .collect()
                    }
                    None => model
                        .book()
                        .relationships()
                        .iter()
                        .map(|rel| describe(model, rel))
                        .collect(),
                };
                let feedback = format!("{} relationships listed", lines.len());
                Ok(CommandResult::listing(feedback, numbered(lines)))
            }
            Command::AddEvent(event) => {
                model.add_event(event.clone())?;
                Ok(CommandResult::changed(format!("New event added: {}", event)))
            }
            Command::DeleteEvent { index } => {
                let target = event_at(model, *index)?;
                model.delete_event(&target)?;
                Ok(CommandResult::changed(format!("Deleted event: {}", target)))
            }
            Command::ListEvents => {
                model.update_event_filter(MatchAll);
                Ok(list_events(model, "Listed all events"))
            }
            Command::FindEvents(predicate) => {
                model.update_event_filter(predicate.clone());
                let count = model.filtered_events().len();
                Ok(list_events(model, &format!("{} events listed", count)))
            }
            Command::TagEvent { index, tag } => {
                let target = event_at(model, *index)?;
                let tagged = target.with_added_tag(tag.clone())?;
                model.set_event(&target, tagged.clone())?;
                Ok(CommandResult::changed(format!("Added tag to event: {}", tagged)))
            }
            Command::AddContactToEvent {
                event_index,
                person_index,
            } => {
                let event = event_at(model, *event_index)?;
                let person = person_at(model, *person_index)?;
                if event.has_contact(&person) {
                    return Err(CommandError::AlreadyContact {
                        person: person.name().to_string(),
                        event: event.title().to_string(),
                    });
                }
                let updated = event.with_contact(person.clone())?;
                model.set_event(&event, updated)?;
                Ok(CommandResult::changed(format!(
                    "Added {} to event '{}'",
                    person.name(),
                    event.title()
                )))
            }
            Command::Clear => {
                model.clear();
                Ok(CommandResult::changed("Address book has been cleared!"))
            }
        }
    }
}

fn person_at(model: &ModelManager, index: usize) -> Result<Person, CommandError> {
    model.person_at(index).cloned().ok_or(CommandError::InvalidIndex {
        kind: EntityKind::Person,
        index,
    })
}

fn event_at(model: &ModelManager, index: usize) -> Result<Event, CommandError> {
    model.event_at(index).cloned().ok_or(CommandError::InvalidIndex {
        kind: EntityKind::Event,
        index,
    })
}

fn list_persons(model: &ModelManager, feedback: &str) -> CommandResult {
    let lines = model
        .filtered_persons()
        .iter()
        .map(|p| format!("{} (id: {})", p, p.id()))
        .collect();
    CommandResult::listing(feedback, numbered(lines))
}

fn list_events(model: &ModelManager, feedback: &str) -> CommandResult {
    let lines = model
        .filtered_events()
        .iter()
        .map(|e| e.to_string())
        .collect();
    CommandResult::listing(feedback, numbered(lines))
}

fn numbered(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| format!("{}. {}", i + 1, line))
        .collect()
}

fn display_name(model: &ModelManager, id: &PersonId) -> String {
    model
        .book()
        .get_person_by_id(id.as_str())
        .map(|p| p.name().to_string())
        .unwrap_or_else(|| id.to_string())
}

fn describe(model: &ModelManager, rel: &Relationship) -> String {
    let first = display_name(model, rel.user1_id());
    let second = display_name(model, rel.user2_id());
    format!(
        "{} is {} of {}; {} is {} of {}",
        first,
        rel.forward_name(),
        second,
        second,
        rel.reverse_name(),
        first
    )
}

/// Relationship as read from `person`'s side
fn describe_from(model: &ModelManager, rel: &Relationship, person: &Person) -> String {
    let name = rel.name_from(person.id()).unwrap_or_default();
    let other = rel
        .other_end(person.id())
        .map(|id| display_name(model, id))
        .unwrap_or_default();
    format!("{} is {} of {}", person.name(), name, other)
}
