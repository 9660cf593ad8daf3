//! Composite variables.
//!
//! A [`Group`] wraps a user [`Container`] so that its variables are stored as
//! one nested JSON object. Keyed groups sit inside a schema like any other
//! variable; anonymous groups are collection elements, created through
//! [`group`] (re-exported as [`codec::group`](crate::codec::group)).
//!
//! ```
//! use varconf::variable::{Container, DoubleVar, Group, StringVar, Variable};
//!
//! struct Server {
//!     host: StringVar,
//!     weight: DoubleVar,
//! }
//!
//! impl Server {
//!     fn new() -> Self {
//!         Self {
//!             host: StringVar::without_default("host"),
//!             weight: DoubleVar::new("weight", 1.0),
//!         }
//!     }
//! }
//!
//! impl Container for Server {
//!     fn variables(&self) -> Vec<&dyn Variable> {
//!         vec![&self.host, &self.weight]
//!     }
//!
//!     fn variables_mut(&mut self) -> Vec<&mut dyn Variable> {
//!         vec![&mut self.host, &mut self.weight]
//!     }
//! }
//!
//! let mut server = Group::new("server", Server::new()).unwrap();
//! server.load(&serde_json::json!({"host": "example.org", "port": 80}));
//! assert_eq!(server.host.get().as_deref(), Some("example.org"));
//! ```

use std::{
    fmt,
    marker::PhantomData,
    ops::{Deref, DerefMut},
    sync::Arc,
};

use serde_json::{Map, Value};

use super::{Container, Variable};
use crate::{
    codec::Codec,
    error::{SchemaError, kind_name},
    schema::{self, Schema},
};

/// Variable made of a nested set of heterogeneous variables.
pub struct Group<C> {
    key: String,
    inner: C,
    schema: Arc<Schema>,
    dirty: bool,
}

impl<C: Container> Group<C> {
    /// Wrap `inner`, stored under `key` in the parent object.
    ///
    /// # Errors
    ///
    /// Fails if `inner` declares an empty or duplicate key.
    pub fn new(key: impl Into<String>, inner: C) -> Result<Self, SchemaError> {
        let schema = Schema::discover(&inner)?;
        Ok(Self::with_schema(key.into(), inner, Arc::new(schema)))
    }

    /// Wrap `inner` without a key, for use as a collection element.
    ///
    /// An anonymous group cannot be declared directly in a schema.
    pub fn anonymous(inner: C) -> Result<Self, SchemaError> {
        Self::new(String::new(), inner)
    }

    fn with_schema(key: String, inner: C, schema: Arc<Schema>) -> Self {
        Self {
            key,
            inner,
            schema,
            dirty: false,
        }
    }

    /// Whether this group has no key and can only be a collection element.
    pub fn is_anonymous(&self) -> bool {
        self.key.is_empty()
    }

    /// Index of the nested variables.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Nested variables.
    pub fn get(&self) -> &C {
        &self.inner
    }

    /// Replace the nested variables if `inner` has the same schema.
    pub fn set(&mut self, inner: C) {
        if self.validate(&inner) {
            self.inner = inner;
            self.dirty = true;
        } else {
            trace!("`{}`: rejected group with a different schema", self.key);
        }
    }

    /// A candidate is valid when it declares the same keys in the same order.
    pub fn validate(&self, candidate: &C) -> bool {
        Schema::discover(candidate).is_ok_and(|schema| schema == *self.schema)
    }

    /// Saved form of the nested variables.
    pub fn to_object(&self) -> Map<String, Value> {
        self.schema.save(&self.inner)
    }

    /// Consume the group, returning the nested variables.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C> Deref for Group<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<C> DerefMut for Group<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.inner
    }
}

impl<C: Container> Variable for Group<C> {
    fn key(&self) -> &str {
        &self.key
    }

    /// Unknown keys inside a group are dropped, not retained.
    fn load(&mut self, node: &Value) {
        let Value::Object(object) = node else {
            trace!("`{}`: ignoring {} node", self.key, kind_name(node));
            return;
        };
        let key = &self.key;
        self.schema.load(&mut self.inner, object, |unknown, _| {
            debug!("`{key}`: dropping unknown key `{unknown}`");
        });
    }

    fn save(&self) -> Option<Value> {
        Some(Value::Object(self.to_object()))
    }

    fn is_dirty(&self) -> bool {
        self.dirty || schema::is_dirty(&self.inner)
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
        schema::mark_clean(&mut self.inner);
    }

    fn as_container(&self) -> Option<&dyn Container> {
        Some(&self.inner)
    }

    fn as_container_mut(&mut self) -> Option<&mut dyn Container> {
        Some(&mut self.inner)
    }
}

impl<C: Container> Container for Group<C> {
    fn variables(&self) -> Vec<&dyn Variable> {
        self.inner.variables()
    }

    fn variables_mut(&mut self) -> Vec<&mut dyn Variable> {
        self.inner.variables_mut()
    }
}

impl<C: fmt::Debug> fmt::Debug for Group<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("key", &self.key)
            .field("inner", &self.inner)
            .finish()
    }
}

/// Codec turning JSON objects into anonymous [`Group`]s.
pub struct GroupCodec<C, F> {
    factory: F,
    schema: Arc<Schema>,
    _marker: PhantomData<fn() -> C>,
}

/// Codec for collections of records; `factory` builds a fresh element.
///
/// The element schema is checked once, here.
///
/// # Errors
///
/// Fails if the containers built by `factory` declare an empty or duplicate
/// key.
pub fn group<C, F>(factory: F) -> Result<GroupCodec<C, F>, SchemaError>
where
    C: Container,
    F: Fn() -> C,
{
    let schema = Schema::discover(&factory())?;
    Ok(GroupCodec {
        factory,
        schema: Arc::new(schema),
        _marker: PhantomData,
    })
}

impl<C, F> GroupCodec<C, F>
where
    C: Container,
    F: Fn() -> C,
{
    /// A new element holding default values.
    pub fn create(&self) -> Group<C> {
        Group::with_schema(String::new(), (self.factory)(), self.schema.clone())
    }
}

impl<C, F> Codec<Group<C>> for GroupCodec<C, F>
where
    C: Container,
    F: Fn() -> C,
{
    fn encode(&self, value: &Group<C>) -> Value {
        Value::Object(value.to_object())
    }

    fn decode(&self, node: &Value) -> Option<Group<C>> {
        if !node.is_object() {
            return None;
        }
        let mut element = self.create();
        element.load(node);
        element.mark_clean();
        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::variable::{BoolVar, DoubleVar, IntVar, ListVar, StringVar};

    struct Entry {
        name: StringVar,
        value: DoubleVar,
    }

    impl Entry {
        fn new() -> Self {
            Self {
                name: StringVar::without_default("name"),
                value: DoubleVar::new("value", 1.0),
            }
        }
    }

    impl Container for Entry {
        fn variables(&self) -> Vec<&dyn Variable> {
            vec![&self.name, &self.value]
        }

        fn variables_mut(&mut self) -> Vec<&mut dyn Variable> {
            vec![&mut self.name, &mut self.value]
        }
    }

    #[test]
    fn test_group_load_drops_unknown_keys() {
        let mut group = Group::new("entry", Entry::new()).unwrap();
        group.load(&json!({"name": "n", "value": 2.5, "extra": true}));
        assert_eq!(group.name.get().as_deref(), Some("n"));
        assert_eq!(group.value.get(), Some(2.5));
        assert_eq!(group.save(), Some(json!({"name": "n", "value": 2.5})));
    }

    #[test]
    fn test_group_ignores_non_object() {
        let mut group = Group::new("entry", Entry::new()).unwrap();
        group.load(&json!([1, 2]));
        group.load(&json!("x"));
        assert_eq!(group.value.get(), Some(1.0));
    }

    #[test]
    fn test_group_save_always_object() {
        struct Empty;

        impl Container for Empty {
            fn variables(&self) -> Vec<&dyn Variable> {
                Vec::new()
            }

            fn variables_mut(&mut self) -> Vec<&mut dyn Variable> {
                Vec::new()
            }
        }

        let group = Group::new("empty", Empty).unwrap();
        assert_eq!(group.save(), Some(json!({})));

        struct Absent {
            flag: BoolVar,
        }

        impl Container for Absent {
            fn variables(&self) -> Vec<&dyn Variable> {
                vec![&self.flag]
            }

            fn variables_mut(&mut self) -> Vec<&mut dyn Variable> {
                vec![&mut self.flag]
            }
        }

        let group = Group::new(
            "absent",
            Absent {
                flag: BoolVar::without_default("flag").allow_nulls(false),
            },
        )
        .unwrap();
        assert_eq!(group.save(), Some(json!({})));
    }

    #[test]
    fn test_group_dirty_follows_children() {
        let mut group = Group::new("entry", Entry::new()).unwrap();
        assert!(!group.is_dirty());
        group.value.set(3.0);
        assert!(group.is_dirty());
        group.mark_clean();
        assert!(!group.is_dirty());
        assert!(!group.value.is_dirty());
    }

    struct Broken {
        a: IntVar,
        b: IntVar,
    }

    impl Container for Broken {
        fn variables(&self) -> Vec<&dyn Variable> {
            vec![&self.a, &self.b]
        }

        fn variables_mut(&mut self) -> Vec<&mut dyn Variable> {
            vec![&mut self.a, &mut self.b]
        }
    }

    fn broken() -> Broken {
        Broken {
            a: IntVar::new("same", 0),
            b: IntVar::new("same", 1),
        }
    }

    #[test]
    fn test_duplicate_keys_fail_construction() {
        assert!(Group::new("broken", broken()).is_err());
        assert!(group(broken).is_err());
    }

    #[test]
    fn test_set_requires_same_schema() {
        let mut group = Group::new("entry", Entry::new()).unwrap();
        let mut replacement = Entry::new();
        replacement.value.set(9.0);
        group.set(replacement);
        assert_eq!(group.value.get(), Some(9.0));
        assert!(group.is_dirty());

        let mut renamed = Entry::new();
        renamed.name = StringVar::without_default("title");
        renamed.value.set(4.0);
        group.set(renamed);
        assert_eq!(group.value.get(), Some(9.0));
    }

    #[test]
    fn test_list_of_groups() {
        let codec = group(Entry::new).unwrap();
        let mut first = codec.create();
        first.name.set("first".to_string());

        let mut list = ListVar::with_items("entries", vec![Some(first), None], codec);
        assert_eq!(
            list.save(),
            Some(json!([{"name": "first", "value": 1.0}, null]))
        );

        list.load(&json!([{"name": "a", "value": 3}, {"value": "bad"}, 5, null]));
        assert_eq!(list.len(), 3);
        let a = list[0].as_ref().unwrap();
        assert_eq!(a.name.get().as_deref(), Some("a"));
        assert_eq!(a.value.get(), Some(3.0));
        assert!(a.is_anonymous());
        let b = list[1].as_ref().unwrap();
        assert_eq!(b.name.get(), None);
        assert_eq!(b.value.get(), Some(1.0));
        assert!(list[2].is_none());
    }

    #[test]
    fn test_anonymous_group_roundtrip_via_codec() {
        let codec = group(Entry::new).unwrap();
        let node = json!({"name": "x", "value": 0.5});
        let element = codec.decode(&node).unwrap();
        assert!(!element.is_dirty());
        assert_eq!(codec.encode(&element), node);
        assert!(codec.decode(&json!([node])).is_none());
    }
}
