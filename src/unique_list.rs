use std::cmp::Ordering;
use std::fmt;

use crate::error::{EntityKind, ModelError, Result};

/// Domain equality used for duplicate detection.
///
/// Looser than `PartialEq`: two persons with the same name and phone are
/// the same person even if their other fields (or ids) differ.
pub trait DomainIdentity {
    const KIND: EntityKind;

    fn is_same(&self, other: &Self) -> bool;
}

/// Ordered list that never holds two domain-equal elements.
///
/// Lookups for `set_item`/`remove` use full equality; `contains` and the
/// duplicate checks use `DomainIdentity::is_same`. The backing `Vec` is
/// only reachable as a slice, so the invariant cannot be bypassed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct UniqueEntityList<T> {
    items: Vec<T>,
}

impl<T> Default for UniqueEntityList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: DomainIdentity + PartialEq> UniqueEntityList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from `items`, rejecting the whole batch on any collision
    pub fn from_vec(items: Vec<T>) -> Result<Self> {
        if !all_unique(&items) {
            return Err(ModelError::DuplicateEntry(T::KIND));
        }
        Ok(Self { items })
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.iter().any(|existing| existing.is_same(item))
    }

    /// Append `item`, preserving insertion order
    pub fn add(&mut self, item: T) -> Result<()> {
        if self.contains(&item) {
            return Err(ModelError::DuplicateEntry(T::KIND));
        }
        self.items.push(item);
        Ok(())
    }

    /// Replace `target` with `replacement` at the same position
    pub fn set_item(&mut self, target: &T, replacement: T) -> Result<()> {
        let index = self
            .position(target)
            .ok_or(ModelError::EntryNotFound(T::KIND))?;

        let collides = self
            .items
            .iter()
            .enumerate()
            .any(|(i, existing)| i != index && existing.is_same(&replacement));
        if collides {
            return Err(ModelError::DuplicateEntry(T::KIND));
        }

        self.items[index] = replacement;
        Ok(())
    }

    /// Remove `item` and return the stored value
    pub fn remove(&mut self, item: &T) -> Result<T> {
        let index = self
            .position(item)
            .ok_or(ModelError::EntryNotFound(T::KIND))?;
        Ok(self.items.remove(index))
    }

    /// Replace the whole contents, rejecting the batch on any collision
    pub fn set_all(&mut self, items: Vec<T>) -> Result<()> {
        *self = Self::from_vec(items)?;
        Ok(())
    }

    pub fn position(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|existing| existing == item)
    }

    pub(crate) fn retain<F>(&mut self, keep: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        let (kept, dropped): (Vec<T>, Vec<T>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| keep(item));
        self.items = kept;
        dropped
    }

    /// Stable in-place sort
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.items.sort_by(compare);
    }
}

impl<T> UniqueEntityList<T> {
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, T> IntoIterator for &'a UniqueEntityList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for UniqueEntityList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

fn all_unique<T: DomainIdentity>(items: &[T]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(i, a)| items[i + 1..].iter().all(|b| !a.is_same(b)))
}
