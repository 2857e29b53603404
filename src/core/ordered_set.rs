//! Insertion-ordered collection of unique strings.
//!
//! Each entry has a lookup key and a stored value. For plain sets (cppflags,
//! result lines) the key is the value itself; feature macros are keyed by
//! name and store the rendered `#define` line, so redefining a name rewrites
//! the line in place without moving it.
//!
//! Positions are 1-based and always form the contiguous range `1..=len`.

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    key: String,
    value: String,
}

/// An ordered set of strings with O(1) membership checks.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct OrderedSet {
    entries: Vec<Entry>,
    /// key -> index into `entries`
    index: HashMap<String, usize>,
}

impl OrderedSet {
    /// Create an empty set.
    pub fn new() -> Self {
        OrderedSet {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Append `value` keyed by itself. No-op if already present.
    ///
    /// Returns `true` if the value was added.
    pub fn add(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.index.contains_key(&value) {
            return false;
        }
        self.push(value.clone(), value);
        true
    }

    /// Insert `value` under `key`.
    ///
    /// An existing key keeps its position and has its value replaced;
    /// a new key is appended.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&idx) => self.entries[idx].value = value,
            None => self.push(key, value),
        }
    }

    fn push(&mut self, key: String, value: String) {
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(Entry { key, value });
    }

    /// Remove the entry stored under `key`. No-op if absent.
    ///
    /// Every entry after the removed one moves up by one position.
    pub fn remove(&mut self, key: &str) -> bool {
        let Some(idx) = self.index.remove(key) else {
            return false;
        };
        self.entries.remove(idx);
        for (offset, entry) in self.entries[idx..].iter().enumerate() {
            if let Some(pos) = self.index.get_mut(&entry.key) {
                *pos = idx + offset;
            }
        }
        true
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// The 1-based position of `key`, if present.
    pub fn position_of(&self, key: &str) -> Option<usize> {
        self.index.get(key).map(|idx| idx + 1)
    }

    /// The value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&idx| self.entries[idx].value.as_str())
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.value.as_str())
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for OrderedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values()).finish()
    }
}

impl<S: Into<String>> FromIterator<S> for OrderedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = OrderedSet::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for OrderedSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}
