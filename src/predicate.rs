use std::fmt;

use crate::event::Event;
use crate::person::Person;

/// Boolean test over an entity, used to filter list views.
///
/// Implementations are pure and stateless, so one instance can be reused
/// across queries. Combine with [`Predicate::and`], [`Predicate::or`] and
/// [`Predicate::negate`]; the combinators keep structural equality.
pub trait Predicate<T: ?Sized>: fmt::Debug {
    fn test(&self, item: &T) -> bool;

    fn and<P>(self, other: P) -> And<Self, P>
    where
        Self: Sized,
        P: Predicate<T>,
    {
        And(self, other)
    }

    fn or<P>(self, other: P) -> Or<Self, P>
    where
        Self: Sized,
        P: Predicate<T>,
    {
        Or(self, other)
    }

    fn negate(self) -> Not<Self>
    where
        Self: Sized,
    {
        Not(self)
    }
}

impl<T: ?Sized, P: Predicate<T> + ?Sized> Predicate<T> for Box<P> {
    fn test(&self, item: &T) -> bool {
        (**self).test(item)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct And<A, B>(pub A, pub B);

impl<T: ?Sized, A: Predicate<T>, B: Predicate<T>> Predicate<T> for And<A, B> {
    fn test(&self, item: &T) -> bool {
        self.0.test(item) && self.1.test(item)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Or<A, B>(pub A, pub B);

impl<T: ?Sized, A: Predicate<T>, B: Predicate<T>> Predicate<T> for Or<A, B> {
    fn test(&self, item: &T) -> bool {
        self.0.test(item) || self.1.test(item)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Not<A>(pub A);

impl<T: ?Sized, A: Predicate<T>> Predicate<T> for Not<A> {
    fn test(&self, item: &T) -> bool {
        !self.0.test(item)
    }
}

/// Matches everything ("list all")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchAll;

impl<T: ?Sized> Predicate<T> for MatchAll {
    fn test(&self, _item: &T) -> bool {
        true
    }
}

/// Any keyword is a case-insensitive substring of `value`
fn any_keyword_in(keywords: &[String], value: &str) -> bool {
    let value = value.to_lowercase();
    keywords
        .iter()
        .any(|keyword| value.contains(&keyword.to_lowercase()))
}

/// Person field searched by a [`PersonKeywordPredicate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonField {
    Name,
    Phone,
    Social,
    Address,
    Tag,
}

/// Satisfied when any keyword is a case-insensitive substring of the field.
///
/// Keywords arrive already tokenized; equality is order-sensitive on the
/// keyword list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersonKeywordPredicate {
    field: PersonField,
    keywords: Vec<String>,
}

impl PersonKeywordPredicate {
    pub fn new(field: PersonField, keywords: Vec<String>) -> Self {
        Self { field, keywords }
    }

    pub fn name(keywords: Vec<String>) -> Self {
        Self::new(PersonField::Name, keywords)
    }

    pub fn phone(keywords: Vec<String>) -> Self {
        Self::new(PersonField::Phone, keywords)
    }

    pub fn social(keywords: Vec<String>) -> Self {
        Self::new(PersonField::Social, keywords)
    }

    pub fn address(keywords: Vec<String>) -> Self {
        Self::new(PersonField::Address, keywords)
    }

    pub fn tag(keywords: Vec<String>) -> Self {
        Self::new(PersonField::Tag, keywords)
    }

    pub fn field(&self) -> PersonField {
        self.field
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Predicate<Person> for PersonKeywordPredicate {
    fn test(&self, person: &Person) -> bool {
        match self.field {
            PersonField::Name => any_keyword_in(&self.keywords, person.name()),
            PersonField::Phone => any_keyword_in(&self.keywords, person.phone()),
            PersonField::Social => person
                .social()
                .is_some_and(|social| any_keyword_in(&self.keywords, social)),
            PersonField::Address => person
                .address()
                .is_some_and(|address| any_keyword_in(&self.keywords, address)),
            PersonField::Tag => person
                .tags()
                .iter()
                .any(|tag| any_keyword_in(&self.keywords, tag.name())),
        }
    }
}

/// Event field searched by an [`EventKeywordPredicate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventField {
    Title,
    Location,
    Description,
    Tag,
    /// Name of any contact on the roster
    Contact,
}

/// Event counterpart of [`PersonKeywordPredicate`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKeywordPredicate {
    field: EventField,
    keywords: Vec<String>,
}

impl EventKeywordPredicate {
    pub fn new(field: EventField, keywords: Vec<String>) -> Self {
        Self { field, keywords }
    }

    pub fn title(keywords: Vec<String>) -> Self {
        Self::new(EventField::Title, keywords)
    }

    pub fn tag(keywords: Vec<String>) -> Self {
        Self::new(EventField::Tag, keywords)
    }

    pub fn field(&self) -> EventField {
        self.field
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Predicate<Event> for EventKeywordPredicate {
    fn test(&self, event: &Event) -> bool {
        match self.field {
            EventField::Title => any_keyword_in(&self.keywords, event.title()),
            EventField::Location => event
                .location()
                .is_some_and(|location| any_keyword_in(&self.keywords, location)),
            EventField::Description => event
                .description()
                .is_some_and(|description| any_keyword_in(&self.keywords, description)),
            EventField::Tag => event
                .tags()
                .iter()
                .any(|tag| any_keyword_in(&self.keywords, tag.name())),
            EventField::Contact => event
                .contacts()
                .iter()
                .any(|contact| any_keyword_in(&self.keywords, contact.name())),
        }
    }
}
