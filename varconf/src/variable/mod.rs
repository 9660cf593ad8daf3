//! Typed configuration variables.
//!
//! Every variable is bound to one key of its parent JSON object and knows how
//! to merge a JSON node into its current value ([`Variable::load`]) and how
//! to turn that value back into a node ([`Variable::save`]).
//!
//! - [`primitive`] - strings, characters, booleans and bounded numbers
//! - [`enumeration`] - closed sets of named values
//! - [`collection`] - homogeneous lists and string-keyed maps
//! - [`group`] - nested heterogeneous records

use serde_json::Value;

/// Primitive leaves and bounded numbers.
pub mod primitive;

/// Enumeration variables.
pub mod enumeration;

/// List and map variables.
pub mod collection;

/// Composite variables.
pub mod group;

pub use collection::{ListVar, MapVar};
pub use enumeration::{EnumVar, Variants};
pub use group::Group;
pub use primitive::{
    BoolVar, CharVar, Constraint, DoubleVar, FloatVar, IntVar, LongVar, Primitive, Range,
    ShortVar, StringVar, Unbounded, Var,
};

/// Type-erased view of a configuration variable.
///
/// This is what the schema engine works with: it only needs the key and the
/// JSON round trip. Typed `get`/`set`/`validate` live on the concrete types.
pub trait Variable {
    /// Key this variable is stored under in its parent object.
    fn key(&self) -> &str;

    /// Merge a JSON node into the current value.
    ///
    /// Nodes of the wrong kind and values rejected by validation are ignored
    /// and leave the previous value in place.
    fn load(&mut self, node: &Value);

    /// Encode the current value, or `None` to omit the key.
    fn save(&self) -> Option<Value>;

    /// Whether an accepted change has not been written to disk yet.
    fn is_dirty(&self) -> bool;

    /// Forget pending changes, after a load or save.
    fn mark_clean(&mut self);

    /// Child variables, if this variable is itself a schema container.
    fn as_container(&self) -> Option<&dyn Container> {
        None
    }

    /// Mutable child variables, if this variable is itself a schema container.
    fn as_container_mut(&mut self) -> Option<&mut dyn Container> {
        None
    }
}

/// A set of variables forming one JSON object.
///
/// Implementors list their variable fields explicitly, in the order they
/// should appear in the saved document. Both methods must return the same
/// variables in the same order on every call.
///
/// ```
/// use varconf::variable::{BoolVar, Container, StringVar, Variable};
///
/// struct Settings {
///     name: StringVar,
///     enabled: BoolVar,
/// }
///
/// impl Container for Settings {
///     fn variables(&self) -> Vec<&dyn Variable> {
///         vec![&self.name, &self.enabled]
///     }
///
///     fn variables_mut(&mut self) -> Vec<&mut dyn Variable> {
///         vec![&mut self.name, &mut self.enabled]
///     }
/// }
/// ```
pub trait Container {
    /// Declared variables, in declaration order.
    fn variables(&self) -> Vec<&dyn Variable>;

    /// Declared variables, in declaration order.
    fn variables_mut(&mut self) -> Vec<&mut dyn Variable>;
}

/// Stored state of a variable.
#[derive(Debug, Clone)]
enum Current<T> {
    /// Never set; reads fall back to the default.
    Unset,
    /// Explicitly set to null.
    Null,
    Set(T),
}

/// Value storage shared by the scalar variable kinds.
///
/// Holds the key, the default and the current value, and implements the
/// read-fallback rules. Validation is left to the owning variable.
#[derive(Debug, Clone)]
pub(crate) struct Slot<T> {
    key: String,
    default: Option<T>,
    current: Current<T>,
    allow_nulls: bool,
    dirty: bool,
}

impl<T> Slot<T> {
    pub(crate) fn new(key: impl Into<String>, default: Option<T>) -> Self {
        let allow_nulls = default.is_none();
        Self {
            key: key.into(),
            default,
            current: Current::Unset,
            allow_nulls,
            dirty: false,
        }
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn default(&self) -> Option<&T> {
        self.default.as_ref()
    }

    pub(crate) fn allow_nulls(&self) -> bool {
        self.allow_nulls
    }

    pub(crate) fn set_allow_nulls(&mut self, allow: bool) {
        self.allow_nulls = allow;
    }

    /// Effective value: the current one if it may be observed, else the default.
    pub(crate) fn get(&self) -> Option<&T> {
        match &self.current {
            Current::Set(value) => Some(value),
            Current::Null if self.allow_nulls => None,
            _ => self.default.as_ref(),
        }
    }

    /// Explicitly stored value, ignoring the default.
    pub(crate) fn current(&self) -> Option<&T> {
        match &self.current {
            Current::Set(value) => Some(value),
            Current::Unset | Current::Null => None,
        }
    }

    /// Store an already validated value.
    pub(crate) fn replace(&mut self, value: Option<T>) {
        self.current = match value {
            Some(value) => Current::Set(value),
            None => Current::Null,
        };
        self.dirty = true;
    }

    /// Drop the current value so reads return the default again.
    pub(crate) fn reset(&mut self) {
        if !matches!(self.current, Current::Unset) {
            self.dirty = true;
        }
        self.current = Current::Unset;
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Shared save rule: `null` only when nothing but null is available and
    /// nulls are allowed, absent when nulls are not allowed either.
    pub(crate) fn save_with(&self, encode: impl FnOnce(&T) -> Value) -> Option<Value> {
        match self.get().or(self.default.as_ref()) {
            Some(value) => Some(encode(value)),
            None if self.allow_nulls => Some(Value::Null),
            None => None,
        }
    }
}
