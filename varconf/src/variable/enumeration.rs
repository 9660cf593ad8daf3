use serde_json::Value;

use super::{Slot, Variable};
use crate::error::kind_name;

/// A closed set of named values.
///
/// ```
/// use varconf::variable::Variants;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Mode {
///     Fast,
///     Safe,
/// }
///
/// impl Variants for Mode {
///     const VARIANTS: &'static [Self] = &[Mode::Fast, Mode::Safe];
///
///     fn name(&self) -> &str {
///         match self {
///             Mode::Fast => "Fast",
///             Mode::Safe => "Safe",
///         }
///     }
/// }
/// ```
pub trait Variants: Sized + Clone + PartialEq + 'static {
    /// Every value, in ordinal order.
    const VARIANTS: &'static [Self];

    /// Symbolic name written to JSON.
    fn name(&self) -> &str;
}

/// Resolve a node against `values` by case-insensitive name or by ordinal.
pub(crate) fn resolve<E: Variants>(values: &[E], node: &Value) -> Option<E> {
    match node {
        Value::Number(n) => {
            let ordinal = n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                    .map(|f| f as u64)
            })?;
            usize::try_from(ordinal)
                .ok()
                .and_then(|idx| values.get(idx))
                .cloned()
        }
        Value::String(s) => values
            .iter()
            .find(|v| v.name().eq_ignore_ascii_case(s))
            .cloned(),
        _ => None,
    }
}

/// Variable selecting one of a fixed list of values.
///
/// Loads from either a name (ASCII case-insensitive) or a zero-based
/// ordinal, which may be written as an integral float such as `1.0`. Saves
/// the name of an explicitly stored value.
#[derive(Debug, Clone)]
pub struct EnumVar<E> {
    slot: Slot<E>,
    values: Vec<E>,
}

impl<E: Variants> EnumVar<E> {
    /// Create a variable accepting every value of `E`.
    pub fn new(key: impl Into<String>, default: E) -> Self {
        Self::with_values(key, E::VARIANTS.to_vec(), Some(default))
    }

    /// Create a variable with no default; it accepts nulls.
    pub fn without_default(key: impl Into<String>) -> Self {
        Self::with_values(key, E::VARIANTS.to_vec(), None)
    }

    /// Create a variable restricted to `values`, whose order defines ordinals.
    pub fn with_values(key: impl Into<String>, values: Vec<E>, default: Option<E>) -> Self {
        Self {
            slot: Slot::new(key, default),
            values,
        }
    }

    /// Builder-style override of the null policy.
    pub fn allow_nulls(mut self, allow: bool) -> Self {
        self.slot.set_allow_nulls(allow);
        self
    }

    /// Accepted values, in ordinal order.
    pub fn values(&self) -> &[E] {
        &self.values
    }

    /// Current value, falling back to the default.
    pub fn get(&self) -> Option<E> {
        self.slot.get().cloned()
    }

    /// Store `value` if it is one of [`EnumVar::values`].
    pub fn set(&mut self, value: E) {
        self.set_option(Some(value));
    }

    /// Store `candidate` if it passes [`EnumVar::validate`]; otherwise do nothing.
    pub fn set_option(&mut self, candidate: Option<E>) {
        if self.validate(candidate.as_ref()) {
            self.slot.replace(candidate);
        }
    }

    /// Forget the current value; reads return the default again.
    pub fn reset(&mut self) {
        self.slot.reset();
    }

    /// Null policy plus membership in [`EnumVar::values`].
    pub fn validate(&self, candidate: Option<&E>) -> bool {
        match candidate {
            None => self.slot.allow_nulls(),
            Some(value) => self.values.contains(value),
        }
    }
}

impl<E: Variants> Variable for EnumVar<E> {
    fn key(&self) -> &str {
        self.slot.key()
    }

    fn load(&mut self, node: &Value) {
        match resolve(&self.values, node) {
            Some(value) => self.set(value),
            None => trace!(
                "`{}`: no variant matches {} node",
                self.slot.key(),
                kind_name(node)
            ),
        }
    }

    /// Only an explicitly stored value is written; an untouched default
    /// leaves the key out.
    fn save(&self) -> Option<Value> {
        self.slot
            .current()
            .map(|value| Value::String(value.name().to_string()))
    }

    fn is_dirty(&self) -> bool {
        self.slot.is_dirty()
    }

    fn mark_clean(&mut self) {
        self.slot.mark_clean();
    }
}
