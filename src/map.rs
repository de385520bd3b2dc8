//! Ordered mapping type for YAML mappings.
//!
//! [`Mapping`] wraps an [`IndexMap`] keyed by [`Value`], so any hashable YAML
//! value can be a key and entries keep the order they were loaded or inserted
//! in. Dumping a mapping writes its entries in that order unless
//! [`DumpOptions::sort_keys`](crate::DumpOptions) is set.
//!
//! ## Examples
//!
//! ```rust
//! use serde_yamlet::{Mapping, Value};
//!
//! let mut map = Mapping::new();
//! map.insert(Value::from("name"), Value::from("Alice"));
//! map.insert(Value::from(1), Value::from("one"));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get_str("name").and_then(|v| v.as_str()), Some("Alice"));
//! assert_eq!(map.get(&Value::from(1)).and_then(|v| v.as_str()), Some("one"));
//! ```

use crate::value::Value;
use indexmap::IndexMap;
use std::hash::{Hash, Hasher};

/// An insertion-ordered map from YAML values to YAML values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping(IndexMap<Value, Value>);

impl Eq for Mapping {}

impl Mapping {
    #[must_use]
    pub fn new() -> Self {
        Mapping(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Mapping(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair, returning the previous value for the key.
    ///
    /// An existing key keeps its position.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &Value) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Looks up a string key.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.0.get(&Value::String(key.to_string()))
    }

    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, Value, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, Value, Value> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, Value, Value> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, Value, Value> {
        self.0.iter_mut()
    }
}

impl Hash for Mapping {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Equal mappings may differ in order, so combine entry hashes
        // commutatively.
        let mut combined: u64 = 0;
        for (key, value) in &self.0 {
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            key.hash(&mut hasher);
            value.hash(&mut hasher);
            combined ^= hasher.finish();
        }
        self.0.len().hash(state);
        combined.hash(state);
    }
}

impl From<IndexMap<Value, Value>> for Mapping {
    fn from(map: IndexMap<Value, Value>) -> Self {
        Mapping(map)
    }
}

impl From<Mapping> for IndexMap<Value, Value> {
    fn from(map: Mapping) -> Self {
        map.0
    }
}

impl IntoIterator for Mapping {
    type Item = (Value, Value);
    type IntoIter = indexmap::map::IntoIter<Value, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Mapping {
    type Item = (&'a Value, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Value, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(Value, Value)> for Mapping {
    fn from_iter<T: IntoIterator<Item = (Value, Value)>>(iter: T) -> Self {
        Mapping(IndexMap::from_iter(iter))
    }
}

impl Extend<(Value, Value)> for Mapping {
    fn extend<T: IntoIterator<Item = (Value, Value)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}
