pub mod address_book;
pub mod commands;
pub mod config;
pub mod date;
pub mod error;
pub mod event;
pub mod ids;
pub mod logging;
pub mod manager;
pub mod person;
pub mod predicate;
pub mod relationship;
pub mod storage;
pub mod tag;
pub mod unique_list;

// Re-export commonly used types
pub use address_book::{AddressBook, AddressBookData, CascadeSummary, ReadOnlyAddressBook};
pub use commands::{Command, CommandError, CommandResult, EditPersonDescriptor};
pub use error::{EntityKind, ModelError, Result};
pub use event::{Event, EventBuilder};
pub use ids::PersonId;
pub use manager::ModelManager;
pub use person::{Person, PersonBuilder, PersonSortKey};
pub use predicate::{
    EventField, EventKeywordPredicate, MatchAll, PersonField, PersonKeywordPredicate, Predicate,
};
pub use relationship::{PairKey, Relationship, RelationshipBuilder};
pub use storage::JsonAddressBookStorage;
pub use tag::Tag;
pub use unique_list::{DomainIdentity, UniqueEntityList};
