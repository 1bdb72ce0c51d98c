//! Ordered Container
//!
//! A dense sequence of owned entries addressed by key. Removing never leaves
//! a gap, and an entry can only be in one container because the container
//! owns it.

use std::fmt::Debug;

/// Entries addressable by a stable key
pub trait Keyed {
    type Key: Copy + Eq + Debug;

    fn key(&self) -> Self::Key;
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderedContainer<T> {
    entries: Vec<T>,
}

impl<T> Default for OrderedContainer<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T: Keyed> OrderedContainer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.entries.iter_mut()
    }

    pub fn keys(&self) -> Vec<T::Key> {
        self.entries.iter().map(Keyed::key).collect()
    }

    pub fn position(&self, key: T::Key) -> Option<usize> {
        self.entries.iter().position(|e| e.key() == key)
    }

    pub fn contains(&self, key: T::Key) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: T::Key) -> Option<&T> {
        self.entries.iter().find(|e| e.key() == key)
    }

    pub fn get_mut(&mut self, key: T::Key) -> Option<&mut T> {
        self.entries.iter_mut().find(|e| e.key() == key)
    }

    /// Keys of the entries just before and after `key`
    pub fn neighbours(&self, key: T::Key) -> Option<(Option<T::Key>, Option<T::Key>)> {
        let i = self.position(key)?;
        let prev = i.checked_sub(1).map(|p| self.entries[p].key());
        let next = self.entries.get(i + 1).map(Keyed::key);
        Some((prev, next))
    }

    pub fn push(&mut self, entry: T) {
        self.entries.push(entry);
    }

    /// Insert next to `relative_to`, or append when it is `None`.
    ///
    /// An unknown `relative_to` leaves the container untouched and hands the
    /// entry back.
    pub fn insert(&mut self, entry: T, relative_to: Option<T::Key>, before: bool) -> Result<(), T> {
        let Some(sibling) = relative_to else {
            self.entries.push(entry);
            return Ok(());
        };
        match self.position(sibling) {
            Some(i) => {
                let at = if before { i } else { i + 1 };
                self.entries.insert(at, entry);
                Ok(())
            }
            None => Err(entry),
        }
    }

    /// Insert at an index, clamped to the end
    pub fn insert_at(&mut self, index: usize, entry: T) {
        let at = index.min(self.entries.len());
        self.entries.insert(at, entry);
    }

    /// Remove and return the entry, or `None` when it is not here
    pub fn remove(&mut self, key: T::Key) -> Option<T> {
        let i = self.position(key)?;
        Some(self.entries.remove(i))
    }

    /// Take every entry, in order, leaving the container empty
    pub fn take_all(&mut self) -> Vec<T> {
        std::mem::take(&mut self.entries)
    }
}

impl<T: Keyed> FromIterator<T> for OrderedContainer<T> {
    fn from_iter<It: IntoIterator<Item = T>>(iter: It) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl<T: Keyed> Extend<T> for OrderedContainer<T> {
    fn extend<It: IntoIterator<Item = T>>(&mut self, iter: It) {
        self.entries.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry(char);

    impl Keyed for Entry {
        type Key = char;

        fn key(&self) -> char {
            self.0
        }
    }

    fn container(keys: &str) -> OrderedContainer<Entry> {
        keys.chars().map(Entry).collect()
    }

    fn keys(c: &OrderedContainer<Entry>) -> String {
        c.keys().into_iter().collect()
    }

    #[test]
    fn test_insert_relative() {
        let mut c = container("AB");
        c.insert(Entry('C'), Some('A'), true).unwrap();
        assert_eq!(keys(&c), "CAB");
        c.insert(Entry('D'), Some('A'), false).unwrap();
        assert_eq!(keys(&c), "CADB");
        c.insert(Entry('E'), None, true).unwrap();
        assert_eq!(keys(&c), "CADBE");
    }

    #[test]
    fn test_unknown_sibling_hands_entry_back() {
        let mut c = container("AB");
        assert_eq!(c.insert(Entry('C'), Some('Z'), true), Err(Entry('C')));
        assert_eq!(keys(&c), "AB");
    }

    #[test]
    fn test_remove_is_dense() {
        let mut c = container("ABC");
        assert_eq!(c.remove('B'), Some(Entry('B')));
        assert_eq!(c.remove('B'), None);
        assert_eq!(keys(&c), "AC");
        assert_eq!(c.position('C'), Some(1));
    }

    #[test]
    fn test_neighbours() {
        let c = container("ABC");
        assert_eq!(c.neighbours('A'), Some((None, Some('B'))));
        assert_eq!(c.neighbours('C'), Some((Some('B'), None)));
        assert_eq!(c.neighbours('Z'), None);
    }

    #[test]
    fn test_insert_at_clamps() {
        let mut c = container("AB");
        c.insert_at(10, Entry('C'));
        c.insert_at(0, Entry('D'));
        assert_eq!(keys(&c), "DABC");
        assert_eq!(c.take_all().len(), 4);
        assert!(c.is_empty());
    }
}
