use addressbook_rs::date::parse_date;
use addressbook_rs::{
    AddressBook, AddressBookData, EntityKind, Event, ModelError, Person, PersonKeywordPredicate,
    Relationship, Tag,
};

fn person(id: &str, name: &str, phone: &str) -> Person {
    Person::builder(name, phone).id(id).build().unwrap()
}

fn relationship(first: &str, second: &str, forward: &str, reverse: &str) -> Relationship {
    Relationship::builder()
        .user1(first)
        .user2(second)
        .forward_name(forward)
        .reverse_name(reverse)
        .build()
        .unwrap()
}

fn event(title: &str, date: &str, contacts: Vec<Person>) -> Event {
    Event::builder(title, parse_date(date).unwrap())
        .contacts(contacts)
        .build()
        .unwrap()
}

/// Alice, Bob and Carol with a mentorship and a shared meeting
fn sample_book() -> (AddressBook, Person, Person, Person) {
    let alice = person("alice", "Alice Tan", "91234567");
    let bob = person("bob", "Bob Lee", "98765432");
    let carol = person("carol", "Carol Ng", "87654321");

    let mut book = AddressBook::new();
    book.add_person(alice.clone()).unwrap();
    book.add_person(bob.clone()).unwrap();
    book.add_person(carol.clone()).unwrap();
    book.add_relationship(relationship("alice", "bob", "Mentor", "Mentee"))
        .unwrap();
    book.add_relationship(relationship("bob", "carol", "Friend", "Friend"))
        .unwrap();
    book.add_event(event(
        "Budget Meeting",
        "2024-03-01 10:00",
        vec![alice.clone(), bob.clone()],
    ))
    .unwrap();

    (book, alice, bob, carol)
}

#[test]
fn test_remove_person_cascades() {
    let (mut book, alice, bob, _carol) = sample_book();

    let summary = book.remove_person(&alice).unwrap();

    // Person gone
    assert!(!book.has_person(&alice));
    assert_eq!(book.persons().len(), 2);

    // Only the relationship involving Alice is removed
    assert_eq!(summary.relationships_removed.len(), 1);
    assert_eq!(book.relationships().len(), 1);
    assert!(book
        .relationships()
        .iter()
        .all(|rel| !rel.involves(alice.id())));

    // Event kept, roster stripped
    assert_eq!(summary.events_updated, 1);
    assert_eq!(book.events().len(), 1);
    let meeting = &book.events()[0];
    assert_eq!(meeting.title(), "Budget Meeting");
    assert_eq!(meeting.contacts(), &[bob][..]);
}

#[test]
fn test_remove_missing_person_leaves_book_untouched() {
    let (mut book, _alice, _bob, _carol) = sample_book();
    let before = book.clone();
    let stranger = person("dave", "Dave", "555");

    let err = book.remove_person(&stranger).unwrap_err();

    assert_eq!(err, ModelError::EntryNotFound(EntityKind::Person));
    assert_eq!(book, before);
}

#[test]
fn test_remove_person_collapses_events_made_equal() {
    let alice = person("alice", "Alice", "111");
    let bob = person("bob", "Bob", "222");
    let mut book = AddressBook::new();
    book.add_person(alice.clone()).unwrap();
    book.add_person(bob.clone()).unwrap();
    book.add_event(event("Lunch", "2024-05-05 12:00", vec![alice.clone(), bob.clone()]))
        .unwrap();
    book.add_event(event("Lunch", "2024-05-05 12:00", vec![bob.clone()]))
        .unwrap();

    let summary = book.remove_person(&alice).unwrap();

    // The stripped lunch merged into the existing one
    assert_eq!(summary.events_updated, 0);
    assert_eq!(summary.events_merged, 1);
    assert_eq!(book.events().len(), 1);
    assert_eq!(book.events()[0].contacts(), &[bob][..]);
}

#[test]
fn test_set_event_rejects_unknown_original() {
    let (mut book, alice, _bob, _carol) = sample_book();
    let unknown = event("Offsite", "2024-04-01", vec![]);
    let edited = event("Offsite", "2024-04-02", vec![alice]);

    let err = book.set_event(&unknown, edited).unwrap_err();

    assert!(matches!(err, ModelError::IllegalArgument(_)));
    assert_eq!(book.events().len(), 1);
}

#[test]
fn test_set_event_replaces_in_place() {
    let (mut book, alice, _bob, carol) = sample_book();
    let original = book.events()[0].clone();
    let edited = original.with_contact(carol).unwrap();

    book.set_event(&original, edited.clone()).unwrap();

    assert!(book.has_event(&edited));
    assert!(!book.has_event(&original));
    assert!(book.events()[0].has_contact(&alice));
}

#[test]
fn test_remove_relationship_in_reverse_order() {
    let (mut book, _alice, _bob, _carol) = sample_book();

    // Stored as alice -> bob, removed as bob -> alice under the reverse name
    assert!(book.has_relationship_between("bob", "alice", "Mentee").unwrap());
    let removed = book.remove_relationship("bob", "alice", "Mentee").unwrap();

    assert_eq!(removed.forward_name(), "Mentor");
    assert!(!book.has_relationship_between("alice", "bob", "Mentor").unwrap());
    assert_eq!(book.relationships().len(), 1);
}

#[test]
fn test_remove_relationship_wrong_name() {
    let (mut book, _alice, _bob, _carol) = sample_book();

    let err = book.remove_relationship("alice", "bob", "Sibling").unwrap_err();

    assert!(matches!(err, ModelError::RelationshipNotFound { .. }));
    assert_eq!(book.relationships().len(), 2);
}

#[test]
fn test_second_relationship_for_pair_rejected() {
    let (mut book, _alice, _bob, _carol) = sample_book();

    // Same unordered pair, different names
    let err = book
        .add_relationship(relationship("bob", "alice", "Colleague", "Colleague"))
        .unwrap_err();

    assert_eq!(err, ModelError::DuplicateEntry(EntityKind::Relationship));
}

#[test]
fn test_has_relationship_is_orientation_independent() {
    let (book, _alice, _bob, _carol) = sample_book();

    assert!(book.has_relationship(&relationship("alice", "bob", "Mentor", "Mentee")));
    assert!(book.has_relationship(&relationship("bob", "alice", "Mentee", "Mentor")));
    assert!(!book.has_relationship(&relationship("alice", "bob", "Mentee", "Mentor")));
}

#[test]
fn test_book_equality_and_hash() {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(book: &AddressBook) -> u64 {
        let mut hasher = DefaultHasher::new();
        book.hash(&mut hasher);
        hasher.finish()
    }

    let (first, _, _, _) = sample_book();
    let (second, _, _, _) = sample_book();
    assert_eq!(first, second);
    assert_eq!(hash_of(&first), hash_of(&second));

    let mut changed = second.clone();
    changed.clear();
    assert_ne!(first, changed);
    assert_eq!(changed, AddressBook::new());
}

#[test]
fn test_reset_data_with_duplicate_persons() {
    let (mut book, _alice, _bob, _carol) = sample_book();
    let before = book.clone();

    let data = AddressBookData {
        persons: vec![
            person("x1", "Eve", "123"),
            // Same name and phone, different id
            person("x2", "Eve", "123"),
        ],
        ..AddressBookData::default()
    };

    let err = book.reset_data(&data).unwrap_err();

    assert_eq!(err, ModelError::DuplicateEntry(EntityKind::Person));
    assert_eq!(book, before);
}

#[test]
fn test_reset_data_copies_everything() {
    let (source, _alice, _bob, _carol) = sample_book();
    let mut book = AddressBook::new();

    book.reset_data(&source).unwrap();

    assert_eq!(book, source);
}

#[test]
fn test_edit_person_refreshes_event_roster() {
    let (mut book, alice, _bob, _carol) = sample_book();
    let renamed = alice.to_builder().name("Alice Tan-Wong").build().unwrap();

    book.set_person(&alice, renamed.clone()).unwrap();

    assert!(book.has_person(&renamed));
    assert!(book.events()[0].has_contact(&renamed));
    assert!(!book.events()[0].has_contact(&alice));
}

#[test]
fn test_edit_person_into_duplicate_rejected() {
    let (mut book, alice, bob, _carol) = sample_book();
    let clash = alice
        .to_builder()
        .name(bob.name())
        .phone(bob.phone())
        .build()
        .unwrap();

    let err = book.set_person(&alice, clash).unwrap_err();

    assert_eq!(err, ModelError::DuplicateEntry(EntityKind::Person));
    assert!(book.has_person(&alice));
}

#[test]
fn test_filter_and_tags() {
    let (book, _alice, _bob, _carol) = sample_book();

    let matched = book.filter_persons(&PersonKeywordPredicate::name(vec!["lee".to_string()]));
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].name(), "Bob Lee");

    let tagged = book.events()[0]
        .with_added_tag(Tag::new("finance").unwrap())
        .unwrap();
    let err = tagged
        .with_added_tag(Tag::new("finance").unwrap())
        .unwrap_err();
    assert!(matches!(err, ModelError::TagAlreadyPresent(_)));
}
