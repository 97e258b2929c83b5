use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::address_book::{AddressBook, AddressBookData, ReadOnlyAddressBook};
use crate::date::{format_date, parse_date};
use crate::event::Event;
use crate::person::Person;
use crate::relationship::Relationship;
use crate::tag::parse_tags;

/// Person record as stored in the data file
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct JsonAdaptedPerson {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Relationship record as stored in the data file
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct JsonAdaptedRelationship {
    #[serde(rename = "user1Id")]
    pub user1_id: String,
    #[serde(rename = "user2Id")]
    pub user2_id: String,
    #[serde(rename = "forwardName")]
    pub forward_name: String,
    #[serde(rename = "reverseName")]
    pub reverse_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Event record as stored in the data file; contacts are person ids
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct JsonAdaptedEvent {
    pub title: String,
    /// `YYYY-MM-DD HH:MM`
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub contacts: Vec<String>,
}

/// Complete data file
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct JsonAddressBook {
    #[serde(default)]
    pub persons: Vec<JsonAdaptedPerson>,
    #[serde(default)]
    pub relationships: Vec<JsonAdaptedRelationship>,
    #[serde(default)]
    pub events: Vec<JsonAdaptedEvent>,
}

impl From<&Person> for JsonAdaptedPerson {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id().to_string(),
            name: person.name().to_string(),
            phone: person.phone().to_string(),
            social: person.social().map(str::to_string),
            address: person.address().map(str::to_string),
            tags: person.tags().iter().map(|t| t.name().to_string()).collect(),
        }
    }
}

impl From<&Relationship> for JsonAdaptedRelationship {
    fn from(rel: &Relationship) -> Self {
        Self {
            user1_id: rel.user1_id().to_string(),
            user2_id: rel.user2_id().to_string(),
            forward_name: rel.forward_name().to_string(),
            reverse_name: rel.reverse_name().to_string(),
            tags: rel.tags().iter().map(|t| t.name().to_string()).collect(),
        }
    }
}

impl From<&Event> for JsonAdaptedEvent {
    fn from(event: &Event) -> Self {
        Self {
            title: event.title().to_string(),
            date: format_date(event.date()),
            location: event.location().map(str::to_string),
            description: event.description().map(str::to_string),
            tags: event.tags().iter().map(|t| t.name().to_string()).collect(),
            contacts: event.contacts().iter().map(|p| p.id().to_string()).collect(),
        }
    }
}

impl JsonAdaptedPerson {
    pub fn to_model(&self) -> Result<Person> {
        let tags = parse_tags(self.tags.iter().cloned())
            .with_context(|| format!("Invalid tags for person '{}'", self.name))?;
        let mut builder = Person::builder(&self.name, &self.phone)
            .id(self.id.as_str())
            .tags(tags);
        if let Some(social) = &self.social {
            builder = builder.social(social);
        }
        if let Some(address) = &self.address {
            builder = builder.address(address);
        }
        builder
            .build()
            .with_context(|| format!("Invalid person record '{}'", self.name))
    }
}

impl JsonAdaptedRelationship {
    pub fn to_model(&self) -> Result<Relationship> {
        let tags = parse_tags(self.tags.iter().cloned()).with_context(|| {
            format!(
                "Invalid tags for relationship '{}' -> '{}'",
                self.user1_id, self.user2_id
            )
        })?;
        Relationship::builder()
            .user1(self.user1_id.as_str())
            .user2(self.user2_id.as_str())
            .forward_name(&self.forward_name)
            .reverse_name(&self.reverse_name)
            .tags(tags)
            .build()
            .with_context(|| {
                format!(
                    "Invalid relationship record '{}' -> '{}'",
                    self.user1_id, self.user2_id
                )
            })
    }
}

impl JsonAdaptedEvent {
    /// Convert to an event, resolving contact ids against `persons`
    pub fn to_model(&self, persons: &HashMap<&str, &Person>) -> Result<Event> {
        let date = parse_date(&self.date)
            .with_context(|| format!("Invalid date for event '{}'", self.title))?;
        let tags = parse_tags(self.tags.iter().cloned())
            .with_context(|| format!("Invalid tags for event '{}'", self.title))?;

        let mut contacts = Vec::with_capacity(self.contacts.len());
        for id in &self.contacts {
            let person = persons.get(id.as_str()).with_context(|| {
                format!(
                    "Event '{}' references person '{}' which does not exist",
                    self.title, id
                )
            })?;
            contacts.push((*person).clone());
        }

        let mut builder = Event::builder(&self.title, date).tags(tags).contacts(contacts);
        if let Some(location) = &self.location {
            builder = builder.location(location);
        }
        if let Some(description) = &self.description {
            builder = builder.description(description);
        }
        builder
            .build()
            .with_context(|| format!("Invalid event record '{}'", self.title))
    }
}

impl JsonAddressBook {
    pub fn from_book(book: &impl ReadOnlyAddressBook) -> Self {
        Self {
            persons: book.persons().iter().map(JsonAdaptedPerson::from).collect(),
            relationships: book
                .relationships()
                .iter()
                .map(JsonAdaptedRelationship::from)
                .collect(),
            events: book.events().iter().map(JsonAdaptedEvent::from).collect(),
        }
    }

    /// Convert every record and validate the result as a whole
    pub fn to_model(&self) -> Result<AddressBook> {
        let persons = self
            .persons
            .iter()
            .map(JsonAdaptedPerson::to_model)
            .collect::<Result<Vec<_>>>()?;
        let relationships = self
            .relationships
            .iter()
            .map(JsonAdaptedRelationship::to_model)
            .collect::<Result<Vec<_>>>()?;

        let by_id: HashMap<&str, &Person> =
            persons.iter().map(|p| (p.id().as_str(), p)).collect();
        let events = self
            .events
            .iter()
            .map(|event| event.to_model(&by_id))
            .collect::<Result<Vec<_>>>()?;

        let data = AddressBookData {
            persons,
            relationships,
            events,
        };
        AddressBook::from_data(&data).context("Data file violates address book constraints")
    }
}

/// JSON Schema of the data file
pub fn data_file_schema() -> Result<String> {
    let schema = schemars::schema_for!(JsonAddressBook);
    serde_json::to_string_pretty(&schema).context("Failed to serialize data file schema")
}

/// Validate data file path
fn validate_data_path(path: &Path) -> Result<()> {
    match path.extension() {
        Some(ext) if ext == "json" => Ok(()),
        Some(_) => bail!("Invalid data file extension (must be .json)"),
        None => bail!("Data file path must have .json extension"),
    }
}

/// Address book stored as a single pretty-printed JSON document.
///
/// No durability guarantees: the file is rewritten in place on save.
#[derive(Debug, Clone)]
pub struct JsonAddressBookStorage {
    path: PathBuf,
}

impl JsonAddressBookStorage {
    pub fn new(path: PathBuf) -> Result<Self> {
        validate_data_path(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the book; a missing file yields an empty book
    pub fn load(&self) -> Result<AddressBook> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Data file not found, starting empty");
            return Ok(AddressBook::new());
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read data file {}", self.path.display()))?;
        let document: JsonAddressBook = serde_json::from_str(&text)
            .with_context(|| format!("Corrupted data file {}", self.path.display()))?;
        debug!(
            persons = document.persons.len(),
            relationships = document.relationships.len(),
            events = document.events.len(),
            "Data file parsed"
        );
        document.to_model()
    }

    pub fn save(&self, book: &impl ReadOnlyAddressBook) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create data directory {}", parent.display())
                })?;
            }
        }
        let text = serde_json::to_string_pretty(&JsonAddressBook::from_book(book))
            .context("Failed to serialize address book")?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("Failed to write data file {}", self.path.display()))
    }
}
