//! Insertion-ordered keyed collections.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A collection key: an integer index or a string name.
///
/// Numeric-looking strings canonicalize to `Index`, so an item stored
/// under `455` is addressable as `"455"` and survives a JSON round-trip
/// (object keys are always strings on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Index(i64),
    Name(String),
}

impl Key {
    /// Parse a raw string key, canonicalizing numeric forms to `Index`.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(index) => Key::Index(index),
            Err(_) => Key::Name(raw.to_string()),
        }
    }

    /// Integer index, if this is an `Index` key.
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Key::Index(index) => Some(*index),
            Key::Name(_) => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(index) => write!(f, "{}", index),
            Key::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<i64> for Key {
    fn from(index: i64) -> Self {
        Key::Index(index)
    }
}

impl From<i32> for Key {
    fn from(index: i32) -> Self {
        Key::Index(index.into())
    }
}

impl From<&str> for Key {
    fn from(raw: &str) -> Self {
        Key::parse(raw)
    }
}

impl From<String> for Key {
    fn from(raw: String) -> Self {
        Key::parse(&raw)
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Key::parse(&raw))
    }
}

/// An insertion-ordered mapping from [`Key`] to values.
///
/// Serializes as a plain JSON object; nested serializable values expand
/// recursively through serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyedCollection<V> {
    entries: IndexMap<Key, V>,
}

impl<V> KeyedCollection<V> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Wrap a single value as a one-element indexed collection.
    pub fn of(value: V) -> Self {
        let mut collection = Self::new();
        collection.push(value);
        collection
    }

    /// Check whether a key exists.
    pub fn has(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    /// Check whether every given key exists.
    pub fn has_all<'a, I>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = &'a Key>,
    {
        keys.into_iter().all(|key| self.has(key))
    }

    /// Get a value by key. Absent keys yield `None`, never an error.
    pub fn get(&self, key: &Key) -> Option<&V> {
        self.entries.get(key)
    }

    /// Get a mutable value by key.
    pub fn get_mut(&mut self, key: &Key) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    /// Upsert a value under a key, overwriting any existing entry.
    pub fn put(&mut self, key: impl Into<Key>, value: V) -> &mut Self {
        self.entries.insert(key.into(), value);
        self
    }

    /// Append a value under the next integer key, returning the key.
    pub fn push(&mut self, value: V) -> Key {
        let key = Key::Index(self.next_index());
        self.entries.insert(key.clone(), value);
        key
    }

    /// Get and remove a value by key, preserving the order of the rest.
    pub fn pull(&mut self, key: &Key) -> Option<V> {
        self.entries.shift_remove(key)
    }

    /// Remove one or more keys. Missing keys are ignored.
    pub fn forget<I, K>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        for key in keys {
            self.entries.shift_remove(&key.into());
        }
        self
    }

    /// First value in insertion order.
    pub fn first(&self) -> Option<&V> {
        self.entries.values().next()
    }

    /// First value in insertion order satisfying the predicate.
    pub fn first_where<P>(&self, mut predicate: P) -> Option<&V>
    where
        P: FnMut(&Key, &V) -> bool,
    {
        self.entries
            .iter()
            .find(|(key, value)| predicate(key, value))
            .map(|(_, value)| value)
    }

    /// Map every value, keys preserved.
    pub fn map<U, F>(&self, mut f: F) -> KeyedCollection<U>
    where
        F: FnMut(&V) -> U,
    {
        KeyedCollection {
            entries: self
                .entries
                .iter()
                .map(|(key, value)| (key.clone(), f(value)))
                .collect(),
        }
    }

    /// Whether the collection has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &V)> {
        self.entries.iter()
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    /// Iterate values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    fn next_index(&self) -> i64 {
        self.entries
            .keys()
            .filter_map(Key::as_index)
            .max()
            .map_or(0, |max| max + 1)
    }
}

impl<V: Serialize> KeyedCollection<V> {
    /// Convert to a plain JSON structure, expanding nested values.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Convert to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl<V> Default for KeyedCollection<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<Key>, V> FromIterator<(K, V)> for KeyedCollection<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        }
    }
}

impl<K: Into<Key>, V> Extend<(K, V)> for KeyedCollection<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.entries.insert(key.into(), value);
        }
    }
}

impl<V> From<Vec<V>> for KeyedCollection<V> {
    fn from(values: Vec<V>) -> Self {
        values
            .into_iter()
            .enumerate()
            .map(|(index, value)| (index as i64, value))
            .collect()
    }
}

impl<V> IntoIterator for KeyedCollection<V> {
    type Item = (Key, V);
    type IntoIter = indexmap::map::IntoIter<Key, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a KeyedCollection<V> {
    type Item = (&'a Key, &'a V);
    type IntoIter = indexmap::map::Iter<'a, Key, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
