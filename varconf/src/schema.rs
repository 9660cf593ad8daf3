//! Schema discovery and the recursive load/save walk.
//!
//! A [`Schema`] is the key→position index of one [`Container`]. It is built
//! once per container (by [`Group`](crate::variable::Group),
//! [`codec::group`](crate::codec::group) or [`Config`](crate::Config)),
//! rejects malformed declarations up front, and then routes JSON object
//! entries to the matching variables.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{
    error::SchemaError,
    variable::{Container, Variable},
};

/// Ordered, key-unique index of a container's variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    keys: IndexMap<String, usize>,
}

impl Schema {
    /// Index the variables of `container`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::EmptyKey`] if a variable has an empty key,
    /// [`SchemaError::DuplicateKey`] if two variables share a key.
    pub fn discover<C: Container + ?Sized>(container: &C) -> Result<Self, SchemaError> {
        let mut keys = IndexMap::new();
        for (position, variable) in container.variables().into_iter().enumerate() {
            let key = variable.key();
            if key.is_empty() {
                return Err(SchemaError::EmptyKey { position });
            }
            if keys.insert(key.to_string(), position).is_some() {
                return Err(SchemaError::DuplicateKey {
                    key: key.to_string(),
                });
            }
        }
        Ok(Self { keys })
    }

    /// Number of declared variables.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the container declares no variables.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Declared keys, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// Whether a variable is declared under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// Declaration position of `key`.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.keys.get(key).copied()
    }

    /// Route every entry of `object` to the variable declared under its key.
    ///
    /// Entries no variable claims are handed to `unmatched`.
    pub fn load<C: Container + ?Sized>(
        &self,
        container: &mut C,
        object: &Map<String, Value>,
        mut unmatched: impl FnMut(&str, &Value),
    ) {
        let mut variables = container.variables_mut();
        for (key, node) in object {
            match self.position(key).and_then(|pos| variables.get_mut(pos)) {
                Some(variable) => {
                    debug_assert_eq!(
                        variable.key(),
                        key.as_str(),
                        "container no longer matches its schema"
                    );
                    variable.load(node);
                }
                None => unmatched(key, node),
            }
        }
    }

    /// Collect the saved nodes of every variable, in declaration order.
    ///
    /// Variables whose [`Variable::save`] returns `None` are left out.
    pub fn save<C: Container + ?Sized>(&self, container: &C) -> Map<String, Value> {
        let variables = container.variables();
        debug_assert_eq!(
            variables.len(),
            self.keys.len(),
            "container no longer matches its schema"
        );
        self.keys
            .keys()
            .zip(variables)
            .filter_map(|(key, variable)| {
                debug_assert_eq!(
                    variable.key(),
                    key.as_str(),
                    "container no longer matches its schema"
                );
                variable.save().map(|node| (key.clone(), node))
            })
            .collect()
    }
}

/// Whether any variable of `container` has unsaved changes.
pub(crate) fn is_dirty<C: Container + ?Sized>(container: &C) -> bool {
    container.variables().iter().any(|v| v.is_dirty())
}

/// Clear the dirty flag of every variable of `container`.
pub(crate) fn mark_clean<C: Container + ?Sized>(container: &mut C) {
    for variable in container.variables_mut() {
        variable.mark_clean();
    }
}

/// Resolve a dot-separated key path through nested groups.
pub fn find<'a>(container: &'a dyn Container, path: &str) -> Option<&'a dyn Variable> {
    let (head, rest) = split_path(path);
    let variable = container
        .variables()
        .into_iter()
        .find(|v| v.key() == head)?;
    match rest {
        None => Some(variable),
        Some(rest) => find(variable.as_container()?, rest),
    }
}

/// Mutable form of [`find`].
pub fn find_mut<'a>(container: &'a mut dyn Container, path: &str) -> Option<&'a mut dyn Variable> {
    let (head, rest) = split_path(path);
    let variable = container
        .variables_mut()
        .into_iter()
        .find(|v| v.key() == head)?;
    match rest {
        None => Some(variable),
        Some(rest) => find_mut(variable.as_container_mut()?, rest),
    }
}

fn split_path(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::variable::{BoolVar, Group, IntVar, StringVar};

    struct Pair {
        a: IntVar,
        b: StringVar,
    }

    impl Pair {
        fn new(b_key: &str) -> Self {
            Self {
                a: IntVar::new("a", 1),
                b: StringVar::new(b_key, "x".to_string()),
            }
        }
    }

    impl Container for Pair {
        fn variables(&self) -> Vec<&dyn Variable> {
            vec![&self.a, &self.b]
        }

        fn variables_mut(&mut self) -> Vec<&mut dyn Variable> {
            vec![&mut self.a, &mut self.b]
        }
    }

    #[test]
    fn test_discover_keeps_declaration_order() {
        let schema = Schema::discover(&Pair::new("b")).unwrap();
        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(schema.position("b"), Some(1));
        assert!(!schema.contains("c"));
        assert_eq!(schema.len(), 2);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let err = Schema::discover(&Pair::new("a")).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateKey {
                key: "a".to_string()
            }
        );
    }

    #[test]
    fn test_empty_key_rejected() {
        let err = Schema::discover(&Pair::new("")).unwrap_err();
        assert_eq!(err, SchemaError::EmptyKey { position: 1 });
    }

    #[test]
    fn test_load_routes_and_reports_unmatched() {
        let mut pair = Pair::new("b");
        let schema = Schema::discover(&pair).unwrap();
        let object = json!({"b": "y", "z": 3, "a": 7});
        let mut unmatched = Vec::new();
        schema.load(&mut pair, object.as_object().unwrap(), |k, v| {
            unmatched.push((k.to_string(), v.clone()))
        });
        assert_eq!(pair.a.get(), Some(7));
        assert_eq!(pair.b.get().as_deref(), Some("y"));
        assert_eq!(unmatched, vec![("z".to_string(), json!(3))]);
    }

    #[test]
    fn test_save_in_declaration_order() {
        let pair = Pair::new("b");
        let schema = Schema::discover(&pair).unwrap();
        let saved = Value::Object(schema.save(&pair));
        assert_eq!(serde_json::to_string(&saved).unwrap(), r#"{"a":1,"b":"x"}"#);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "container no longer matches its schema")]
    fn test_save_catches_renamed_variable() {
        let mut pair = Pair::new("b");
        let schema = Schema::discover(&pair).unwrap();
        pair.b = StringVar::new("renamed", "x".to_string());
        schema.save(&pair);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "container no longer matches its schema")]
    fn test_load_catches_renamed_variable() {
        let mut pair = Pair::new("b");
        let schema = Schema::discover(&pair).unwrap();
        pair.a = IntVar::new("renamed", 1);
        schema.load(&mut pair, json!({"a": 2}).as_object().unwrap(), |_, _| {});
    }

    struct Outer {
        flag: BoolVar,
        inner: Group<Pair>,
    }

    impl Container for Outer {
        fn variables(&self) -> Vec<&dyn Variable> {
            vec![&self.flag, &self.inner]
        }

        fn variables_mut(&mut self) -> Vec<&mut dyn Variable> {
            vec![&mut self.flag, &mut self.inner]
        }
    }

    #[test]
    fn test_find_by_path() {
        let mut outer = Outer {
            flag: BoolVar::new("flag", false),
            inner: Group::new("inner", Pair::new("b")).unwrap(),
        };
        assert_eq!(find(&outer, "inner.b").map(|v| v.key()), Some("b"));
        assert!(find(&outer, "flag.b").is_none());
        assert!(find(&outer, "inner.c").is_none());

        let variable = find_mut(&mut outer, "inner.a").unwrap();
        variable.load(&json!(42));
        assert_eq!(outer.inner.a.get(), Some(42));
        assert!(is_dirty(&outer));
        mark_clean(&mut outer);
        assert!(!is_dirty(&outer));
    }
}
