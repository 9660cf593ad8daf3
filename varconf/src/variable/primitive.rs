//! Primitive variables: strings, characters, booleans and numbers.
//!
//! All of them share one load/save implementation in [`Var`]; a type only
//! has to say which JSON primitives it accepts and how to convert them
//! ([`Primitive`]). Numbers additionally get an inclusive range check through
//! the [`Range`] constraint.

use std::fmt;

use serde_json::{Number, Value};

use super::{Slot, Variable};
use crate::error::kind_name;

/// Conversion hooks between a Rust type and a JSON primitive.
pub trait Primitive: Sized + Clone {
    /// Whether `node` has the JSON kind this type is stored as.
    fn is_valid(node: &Value) -> bool;

    /// Convert a node that passed [`Primitive::is_valid`].
    fn from_node(node: &Value) -> Self;

    /// Encode a value.
    fn to_node(&self) -> Value;
}

impl Primitive for String {
    fn is_valid(node: &Value) -> bool {
        node.is_string()
    }

    fn from_node(node: &Value) -> Self {
        node.as_str().unwrap_or_default().to_string()
    }

    fn to_node(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Primitive for bool {
    fn is_valid(node: &Value) -> bool {
        node.is_boolean()
    }

    fn from_node(node: &Value) -> Self {
        node.as_bool().unwrap_or_default()
    }

    fn to_node(&self) -> Value {
        Value::Bool(*self)
    }
}

/// Stored as a one character string. Longer strings keep their first
/// character only.
impl Primitive for char {
    fn is_valid(node: &Value) -> bool {
        node.as_str().is_some_and(|s| !s.is_empty())
    }

    fn from_node(node: &Value) -> Self {
        node.as_str()
            .and_then(|s| s.chars().next())
            .unwrap_or_default()
    }

    fn to_node(&self) -> Value {
        Value::String(self.to_string())
    }
}

macro_rules! int_primitive {
    ($($ty:ty),*) => {$(
        impl Primitive for $ty {
            fn is_valid(node: &Value) -> bool {
                node.is_number()
            }

            fn from_node(node: &Value) -> Self {
                match node.as_i64() {
                    Some(i) => i as $ty,
                    None => node.as_f64().unwrap_or_default() as $ty,
                }
            }

            fn to_node(&self) -> Value {
                Value::from(*self)
            }
        }
    )*};
}

macro_rules! float_primitive {
    ($($ty:ty),*) => {$(
        impl Primitive for $ty {
            fn is_valid(node: &Value) -> bool {
                node.is_number()
            }

            fn from_node(node: &Value) -> Self {
                node.as_f64().unwrap_or_default() as $ty
            }

            /// Written in the shortest decimal form that reads back as the
            /// same value. Non-finite values have no JSON representation and
            /// become `null`.
            fn to_node(&self) -> Value {
                self.to_string()
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
    )*};
}

int_primitive!(i16, i32, i64);
float_primitive!(f32, f64);

/// Extra validation applied to non-null candidates.
pub trait Constraint<T> {
    fn check(&self, value: &T) -> bool;
}

/// Accepts every value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unbounded;

impl<T> Constraint<T> for Unbounded {
    fn check(&self, _value: &T) -> bool {
        true
    }
}

/// Inclusive range; a missing bound leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> Default for Range<T> {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
        }
    }
}

impl<T: PartialOrd> Constraint<T> for Range<T> {
    fn check(&self, value: &T) -> bool {
        self.min.as_ref().is_none_or(|min| min <= value)
            && self.max.as_ref().is_none_or(|max| max >= value)
    }
}

/// A variable holding one JSON primitive.
///
/// `C` adds validation on top of the null policy; most aliases below use
/// [`Unbounded`], numeric ones use [`Range`].
///
/// ```
/// use varconf::variable::{FloatVar, Variable};
///
/// let mut ratio = FloatVar::bounded("ratio", 1.0, 0.0, 10.0);
/// ratio.set(20.0);
/// assert_eq!(ratio.get(), Some(1.0));
///
/// ratio.load(&serde_json::json!(2.5));
/// assert_eq!(ratio.get(), Some(2.5));
/// ```
#[derive(Clone)]
pub struct Var<T, C = Unbounded> {
    slot: Slot<T>,
    constraint: C,
}

/// String variable.
pub type StringVar = Var<String>;
/// Boolean variable.
pub type BoolVar = Var<bool>;
/// Single character variable.
pub type CharVar = Var<char>;
/// 16-bit integer variable.
pub type ShortVar = Var<i16, Range<i16>>;
/// 32-bit integer variable.
pub type IntVar = Var<i32, Range<i32>>;
/// 64-bit integer variable.
pub type LongVar = Var<i64, Range<i64>>;
/// Single precision float variable.
pub type FloatVar = Var<f32, Range<f32>>;
/// Double precision float variable.
pub type DoubleVar = Var<f64, Range<f64>>;

impl<T: Primitive, C: Constraint<T> + Default> Var<T, C> {
    /// Create a variable without extra constraints.
    ///
    /// Nulls are rejected unless enabled with [`Var::allow_nulls`].
    pub fn new(key: impl Into<String>, default: T) -> Self {
        Self::with_constraint(key, Some(default), C::default())
    }

    /// Create a variable with no default; it accepts nulls.
    pub fn without_default(key: impl Into<String>) -> Self {
        Self::with_constraint(key, None, C::default())
    }
}

impl<T> Range<T> {
    /// Both bounds set.
    pub fn new(min: T, max: T) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Lower bound only.
    pub fn at_least(min: T) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Upper bound only.
    pub fn at_most(max: T) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }
}

impl<T: Primitive + PartialOrd> Var<T, Range<T>> {
    /// Create a numeric variable limited to `min..=max`.
    pub fn bounded(key: impl Into<String>, default: T, min: T, max: T) -> Self {
        Self::with_constraint(key, Some(default), Range::new(min, max))
    }

    /// Inclusive lower bound.
    pub fn min(&self) -> Option<&T> {
        self.constraint.min.as_ref()
    }

    /// Inclusive upper bound.
    pub fn max(&self) -> Option<&T> {
        self.constraint.max.as_ref()
    }
}

impl<T: Primitive, C: Constraint<T>> Var<T, C> {
    /// Create a variable validated by `constraint`.
    ///
    /// Nulls are accepted only if `default` is `None`.
    pub fn with_constraint(key: impl Into<String>, default: Option<T>, constraint: C) -> Self {
        Self {
            slot: Slot::new(key, default),
            constraint,
        }
    }

    /// Builder-style override of the null policy.
    pub fn allow_nulls(mut self, allow: bool) -> Self {
        self.slot.set_allow_nulls(allow);
        self
    }

    /// Whether `null` is an accepted value.
    pub fn nulls_allowed(&self) -> bool {
        self.slot.allow_nulls()
    }

    /// Value passed at construction.
    pub fn default_value(&self) -> Option<&T> {
        self.slot.default()
    }

    /// Current value, falling back to the default.
    ///
    /// Only returns `None` when nulls are allowed or there is no default.
    pub fn get(&self) -> Option<T> {
        self.slot.get().cloned()
    }

    /// Borrowing form of [`Var::get`].
    pub fn get_ref(&self) -> Option<&T> {
        self.slot.get()
    }

    /// Store `value` if it passes [`Var::validate`]; otherwise do nothing.
    pub fn set(&mut self, value: T) {
        self.set_option(Some(value));
    }

    /// Store null if nulls are allowed; otherwise do nothing.
    pub fn set_null(&mut self) {
        self.set_option(None);
    }

    /// Store `candidate` if it passes [`Var::validate`]; otherwise do nothing.
    pub fn set_option(&mut self, candidate: Option<T>) {
        if self.validate(candidate.as_ref()) {
            self.slot.replace(candidate);
        } else {
            trace!("`{}`: rejected value", self.slot.key());
        }
    }

    /// Forget the current value; reads return the default again.
    pub fn reset(&mut self) {
        self.slot.reset();
    }

    /// Null policy plus the constraint.
    pub fn validate(&self, candidate: Option<&T>) -> bool {
        match candidate {
            None => self.slot.allow_nulls(),
            Some(value) => self.constraint.check(value),
        }
    }
}

impl<T: Primitive, C: Constraint<T>> Variable for Var<T, C> {
    fn key(&self) -> &str {
        self.slot.key()
    }

    fn load(&mut self, node: &Value) {
        if node.is_null() && self.slot.allow_nulls() {
            self.set_option(None);
        } else if T::is_valid(node) {
            self.set(T::from_node(node));
        } else {
            trace!(
                "`{}`: ignoring {} node",
                self.slot.key(),
                kind_name(node)
            );
        }
    }

    fn save(&self) -> Option<Value> {
        self.slot.save_with(T::to_node)
    }

    fn is_dirty(&self) -> bool {
        self.slot.is_dirty()
    }

    fn mark_clean(&mut self) {
        self.slot.mark_clean();
    }
}

impl<T: Primitive + fmt::Debug, C> fmt::Debug for Var<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Var")
            .field("key", &self.slot.key())
            .field("value", &self.slot.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_string_load_and_save() {
        let mut var = StringVar::new("name", "Default".to_string());
        assert_eq!(var.get().as_deref(), Some("Default"));
        assert_eq!(var.save(), Some(json!("Default")));

        var.load(&json!("X"));
        assert_eq!(var.get().as_deref(), Some("X"));
        assert_eq!(var.save(), Some(json!("X")));
    }

    #[test]
    fn test_mismatched_kind_is_ignored() {
        let mut var = BoolVar::new("flag", true);
        var.load(&json!("false"));
        var.load(&json!(0));
        var.load(&json!([false]));
        assert_eq!(var.get(), Some(true));
        assert!(!var.is_dirty());

        let mut var = StringVar::new("name", "a".to_string());
        var.load(&json!(12));
        assert_eq!(var.get().as_deref(), Some("a"));

        let mut var = IntVar::new("n", 4);
        var.load(&json!("5"));
        assert_eq!(var.get(), Some(4));
    }

    #[test]
    fn test_null_only_with_allow_nulls() {
        let mut var = StringVar::new("name", "a".to_string());
        var.load(&json!("b"));
        var.load(&Value::Null);
        assert_eq!(var.get().as_deref(), Some("b"));

        let mut var = StringVar::without_default("name");
        assert!(var.nulls_allowed());
        var.load(&json!("b"));
        var.load(&Value::Null);
        assert_eq!(var.get(), None);
        assert_eq!(var.save(), Some(Value::Null));
    }

    #[test]
    fn test_no_default_and_no_nulls_is_omitted() {
        let var = StringVar::without_default("name").allow_nulls(false);
        assert_eq!(var.get(), None);
        assert_eq!(var.save(), None);
    }

    #[test]
    fn test_set_null_rejected_without_allow_nulls() {
        let mut var = IntVar::new("n", 1);
        var.set(5);
        var.set_null();
        assert_eq!(var.get(), Some(5));
    }

    #[test]
    fn test_char_truncates() {
        let mut var = CharVar::new("c", 'a');
        var.load(&json!("xyz"));
        assert_eq!(var.get(), Some('x'));
        assert_eq!(var.save(), Some(json!("x")));

        var.load(&json!(""));
        assert_eq!(var.get(), Some('x'));

        var.load(&json!("é!"));
        assert_eq!(var.get(), Some('é'));
    }

    #[test]
    fn test_bounds_inclusive() {
        let mut var = IntVar::bounded("n", 5, 0, 10);
        var.set(0);
        assert_eq!(var.get(), Some(0));
        var.set(10);
        assert_eq!(var.get(), Some(10));
        var.set(11);
        assert_eq!(var.get(), Some(10));
        var.set(-1);
        assert_eq!(var.get(), Some(10));
        assert_eq!(var.min(), Some(&0));
        assert_eq!(var.max(), Some(&10));
    }

    #[test]
    fn test_open_bounds() {
        let mut var = LongVar::with_constraint("n", Some(0), Range::at_most(100));
        var.set(i64::MIN);
        assert_eq!(var.get(), Some(i64::MIN));
        var.set(101);
        assert_eq!(var.get(), Some(i64::MIN));

        let mut var = DoubleVar::new("d", 0.0);
        var.set(f64::MAX);
        assert_eq!(var.get(), Some(f64::MAX));
    }

    #[test]
    fn test_bounded_load_rejects_out_of_range() {
        let mut var = FloatVar::bounded("float", 1.0, 0.0, 10.0);
        var.load(&json!(20.0));
        assert_eq!(var.get(), Some(1.0));
        var.load(&json!(10));
        assert_eq!(var.get(), Some(10.0));
    }

    #[test]
    fn test_nan_out_of_bounded_range() {
        let mut var = FloatVar::with_constraint("f", Some(1.0), Range::at_least(0.0));
        var.set(f32::NAN);
        assert_eq!(var.get(), Some(1.0));
    }

    #[test]
    fn test_integer_from_fraction_truncates() {
        let mut var = IntVar::new("n", 0);
        var.load(&json!(2.9));
        assert_eq!(var.get(), Some(2));

        let mut var = ShortVar::new("s", 0);
        var.load(&json!(-7));
        assert_eq!(var.get(), Some(-7));
    }

    #[test]
    fn test_round_trip() {
        let mut var = DoubleVar::bounded("d", 0.5, 0.0, 1.0);
        var.set(0.25);
        let saved = var.save().unwrap();

        let mut other = DoubleVar::bounded("d", 0.5, 0.0, 1.0);
        other.load(&saved);
        assert_eq!(other.save(), Some(saved));
    }

    #[test]
    fn test_float_saves_shortest_decimal() {
        let mut var = FloatVar::bounded("f", 1.0, 0.0, 10.0);
        var.set(0.1);
        assert_eq!(var.save(), Some(json!(0.1)));
        assert_eq!(
            serde_json::to_string(&var.save().unwrap()).unwrap(),
            "0.1"
        );

        var.load(&json!(0.1));
        assert_eq!(var.get(), Some(0.1));

        let mut var = DoubleVar::new("d", 0.0);
        var.set(0.1 + 0.2);
        assert_eq!(var.save(), Some(json!(0.1 + 0.2)));

        let mut var = FloatVar::new("f", 1.0);
        var.set(f32::INFINITY);
        assert_eq!(var.save(), Some(Value::Null));
    }

    #[test]
    fn test_reset_restores_default() {
        let mut var = BoolVar::new("flag", true);
        var.set(false);
        var.reset();
        assert_eq!(var.get(), Some(true));
    }
}
