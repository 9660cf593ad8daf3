//! Homogeneous collection variables.
//!
//! [`ListVar`] and [`MapVar`] are both a variable and a plain container:
//! they deref to their backing `Vec` / `IndexMap`, so application code can
//! push, remove and iterate without going through `get`/`set`. Elements are
//! `Option<T>` because `null` entries survive a load/save cycle.

use std::{
    fmt,
    ops::{Deref, DerefMut},
};

use indexmap::IndexMap;
use serde_json::Value;

use super::Variable;
use crate::{
    codec::{self, Codec},
    error::kind_name,
};

/// Variable holding an ordered list of `T`, stored as a JSON array.
///
/// ```
/// use varconf::{codec, variable::{ListVar, Variable}};
///
/// let mut ints = ListVar::with_items("ints", vec![Some(6)], codec::primitive::<i32>());
/// ints.push(Some(7));
/// assert_eq!(ints.save(), Some(serde_json::json!([6, 7])));
/// ```
pub struct ListVar<T> {
    key: String,
    items: Vec<Option<T>>,
    codec: Box<dyn Codec<T>>,
    dirty: bool,
}

impl<T: 'static> ListVar<T> {
    /// Create an empty list.
    pub fn new(key: impl Into<String>, codec: impl Codec<T> + 'static) -> Self {
        Self::with_items(key, Vec::new(), codec)
    }

    /// Create a list with initial contents.
    pub fn with_items(
        key: impl Into<String>,
        items: Vec<Option<T>>,
        codec: impl Codec<T> + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            items,
            codec: Box::new(codec),
            dirty: false,
        }
    }
}

impl<T> ListVar<T> {
    /// Current contents.
    pub fn get(&self) -> &Vec<Option<T>> {
        &self.items
    }

    /// Replace the contents.
    pub fn set(&mut self, items: Vec<Option<T>>) {
        self.items = items;
        self.dirty = true;
    }

    /// Lists accept any contents.
    pub fn validate(&self, _candidate: &[Option<T>]) -> bool {
        true
    }

    /// Non-null elements, in order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter().flatten()
    }

    /// Consume the variable, returning its contents.
    pub fn into_inner(self) -> Vec<Option<T>> {
        self.items
    }
}

impl<T> Deref for ListVar<T> {
    type Target = Vec<Option<T>>;

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

/// Mutable access counts as a change.
impl<T> DerefMut for ListVar<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.dirty = true;
        &mut self.items
    }
}

impl<T> Variable for ListVar<T> {
    fn key(&self) -> &str {
        &self.key
    }

    fn load(&mut self, node: &Value) {
        match node {
            Value::Array(items) => {
                self.items = codec::decode_list(self.codec.as_ref(), items);
                self.dirty = true;
            }
            other => trace!("`{}`: ignoring {} node", self.key, kind_name(other)),
        }
    }

    fn save(&self) -> Option<Value> {
        Some(Value::Array(codec::encode_list(
            self.codec.as_ref(),
            &self.items,
        )))
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

impl<T: fmt::Debug> fmt::Debug for ListVar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListVar")
            .field("key", &self.key)
            .field("items", &self.items)
            .finish()
    }
}

/// Variable holding string-keyed values of `T`, stored as a JSON object.
///
/// Entries keep insertion order, which is also the order they are saved in.
pub struct MapVar<T> {
    key: String,
    entries: IndexMap<String, Option<T>>,
    codec: Box<dyn Codec<T>>,
    dirty: bool,
}

impl<T: 'static> MapVar<T> {
    /// Create an empty map.
    pub fn new(key: impl Into<String>, codec: impl Codec<T> + 'static) -> Self {
        Self::with_entries(key, IndexMap::new(), codec)
    }

    /// Create a map with initial contents.
    pub fn with_entries(
        key: impl Into<String>,
        entries: IndexMap<String, Option<T>>,
        codec: impl Codec<T> + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            entries,
            codec: Box::new(codec),
            dirty: false,
        }
    }
}

impl<T> MapVar<T> {
    /// Current contents.
    pub fn get(&self) -> &IndexMap<String, Option<T>> {
        &self.entries
    }

    /// Replace the contents.
    pub fn set(&mut self, entries: IndexMap<String, Option<T>>) {
        self.entries = entries;
        self.dirty = true;
    }

    /// Maps accept any contents.
    pub fn validate(&self, _candidate: &IndexMap<String, Option<T>>) -> bool {
        true
    }

    /// Value stored under `name`, if present and non-null.
    pub fn value(&self, name: &str) -> Option<&T> {
        self.entries.get(name).and_then(Option::as_ref)
    }

    /// Consume the variable, returning its contents.
    pub fn into_inner(self) -> IndexMap<String, Option<T>> {
        self.entries
    }
}

impl<T> Deref for MapVar<T> {
    type Target = IndexMap<String, Option<T>>;

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

impl<T> DerefMut for MapVar<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.dirty = true;
        &mut self.entries
    }
}

impl<T> Variable for MapVar<T> {
    fn key(&self) -> &str {
        &self.key
    }

    fn load(&mut self, node: &Value) {
        match node {
            Value::Object(entries) => {
                self.entries = codec::decode_map(self.codec.as_ref(), entries);
                self.dirty = true;
            }
            other => trace!("`{}`: ignoring {} node", self.key, kind_name(other)),
        }
    }

    fn save(&self) -> Option<Value> {
        Some(Value::Object(codec::encode_map(
            self.codec.as_ref(),
            &self.entries,
        )))
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

impl<T: fmt::Debug> fmt::Debug for MapVar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapVar")
            .field("key", &self.key)
            .field("entries", &self.entries)
            .finish()
    }
}
