//! Element codecs for collection variables.
//!
//! A [`Codec`] turns one element into a JSON node and back. Collection
//! variables handle `null` elements themselves, so codecs only ever see
//! present values.
//!
//! ```
//! use varconf::codec::{self, Codec};
//!
//! let ints = codec::primitive::<i32>();
//! assert_eq!(ints.encode(&6), serde_json::json!(6));
//! assert_eq!(ints.decode(&serde_json::json!("6")), None);
//! ```

use std::marker::PhantomData;

use indexmap::IndexMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::variable::{Primitive, Variants, enumeration};

pub use crate::variable::group::{GroupCodec, group};

/// Encode/decode pair for one element type.
pub trait Codec<T> {
    /// Encode a present value.
    fn encode(&self, value: &T) -> Value;

    /// Decode a non-null node, or `None` if it does not represent a `T`.
    fn decode(&self, node: &Value) -> Option<T>;
}

impl<T, C: Codec<T> + ?Sized> Codec<T> for Box<C> {
    fn encode(&self, value: &T) -> Value {
        (**self).encode(value)
    }

    fn decode(&self, node: &Value) -> Option<T> {
        (**self).decode(node)
    }
}

/// Codec for any [`Primitive`] type.
#[derive(Debug)]
pub struct PrimitiveCodec<T>(PhantomData<fn() -> T>);

/// Codec storing `T` as the same JSON primitive a [`Var<T>`](crate::variable::Var) uses.
pub fn primitive<T: Primitive>() -> PrimitiveCodec<T> {
    PrimitiveCodec(PhantomData)
}

impl<T: Primitive> Codec<T> for PrimitiveCodec<T> {
    fn encode(&self, value: &T) -> Value {
        value.to_node()
    }

    fn decode(&self, node: &Value) -> Option<T> {
        T::is_valid(node).then(|| T::from_node(node))
    }
}

/// Codec for enumerations; decodes names and ordinals, encodes names.
#[derive(Debug)]
pub struct EnumCodec<E>(PhantomData<fn() -> E>);

/// Codec for a [`Variants`] type.
pub fn enumeration<E: Variants>() -> EnumCodec<E> {
    EnumCodec(PhantomData)
}

impl<E: Variants> Codec<E> for EnumCodec<E> {
    fn encode(&self, value: &E) -> Value {
        Value::String(value.name().to_string())
    }

    fn decode(&self, node: &Value) -> Option<E> {
        enumeration::resolve(E::VARIANTS, node)
    }
}

/// Codec backed by serde, for arbitrary serializable records.
#[derive(Debug)]
pub struct SerdeCodec<T>(PhantomData<fn() -> T>);

/// Codec going through `serde_json::to_value` / `from_value`.
pub fn serde<T: Serialize + DeserializeOwned>() -> SerdeCodec<T> {
    SerdeCodec(PhantomData)
}

impl<T: Serialize + DeserializeOwned> Codec<T> for SerdeCodec<T> {
    fn encode(&self, value: &T) -> Value {
        serde_json::to_value(value).unwrap_or_else(|e| {
            warn!("failed to encode element: {e}");
            Value::Null
        })
    }

    fn decode(&self, node: &Value) -> Option<T> {
        serde_json::from_value(node.clone())
            .inspect_err(|e| debug!("failed to decode element: {e}"))
            .ok()
    }
}

/// Codec built from two closures.
pub struct FnCodec<E, D> {
    encode: E,
    decode: D,
}

/// Build a codec from an encoder and a decoder.
///
/// ```
/// use varconf::codec::{self, Codec};
/// use serde_json::{Value, json};
///
/// let upper = codec::from_fn(
///     |s: &String| Value::String(s.to_uppercase()),
///     |node: &Value| node.as_str().map(str::to_lowercase),
/// );
/// assert_eq!(upper.encode(&"abc".to_string()), json!("ABC"));
/// ```
pub fn from_fn<T, E, D>(encode: E, decode: D) -> FnCodec<E, D>
where
    E: Fn(&T) -> Value,
    D: Fn(&Value) -> Option<T>,
{
    FnCodec { encode, decode }
}

impl<T, E, D> Codec<T> for FnCodec<E, D>
where
    E: Fn(&T) -> Value,
    D: Fn(&Value) -> Option<T>,
{
    fn encode(&self, value: &T) -> Value {
        (self.encode)(value)
    }

    fn decode(&self, node: &Value) -> Option<T> {
        (self.decode)(node)
    }
}

/// Codec for nested lists, delegating elements to an inner codec.
pub struct ListCodec<C>(C);

/// Codec for `Vec<Option<T>>` elements, e.g. a list of lists.
pub fn list<T, C: Codec<T>>(inner: C) -> ListCodec<C> {
    ListCodec(inner)
}

impl<T, C: Codec<T>> Codec<Vec<Option<T>>> for ListCodec<C> {
    fn encode(&self, value: &Vec<Option<T>>) -> Value {
        Value::Array(encode_list(&self.0, value))
    }

    fn decode(&self, node: &Value) -> Option<Vec<Option<T>>> {
        node.as_array().map(|items| decode_list(&self.0, items))
    }
}

/// Codec for nested string-keyed maps, delegating values to an inner codec.
pub struct MapCodec<C>(C);

/// Codec for `IndexMap<String, Option<T>>` elements, e.g. a list of maps.
pub fn map<T, C: Codec<T>>(inner: C) -> MapCodec<C> {
    MapCodec(inner)
}

impl<T, C: Codec<T>> Codec<IndexMap<String, Option<T>>> for MapCodec<C> {
    fn encode(&self, value: &IndexMap<String, Option<T>>) -> Value {
        Value::Object(encode_map(&self.0, value))
    }

    fn decode(&self, node: &Value) -> Option<IndexMap<String, Option<T>>> {
        node.as_object().map(|entries| decode_map(&self.0, entries))
    }
}

/// Encode a list, writing `None` elements as `null`.
pub(crate) fn encode_list<T, C: Codec<T> + ?Sized>(codec: &C, items: &[Option<T>]) -> Vec<Value> {
    items
        .iter()
        .map(|item| match item {
            Some(value) => codec.encode(value),
            None => Value::Null,
        })
        .collect()
}

/// Decode a list; `null` becomes `None`, undecodable elements are dropped.
pub(crate) fn decode_list<T, C: Codec<T> + ?Sized>(codec: &C, items: &[Value]) -> Vec<Option<T>> {
    items
        .iter()
        .enumerate()
        .filter_map(|(idx, node)| {
            if node.is_null() {
                return Some(None);
            }
            let decoded = codec.decode(node);
            if decoded.is_none() {
                debug!("dropping undecodable list element at index {idx}");
            }
            decoded.map(Some)
        })
        .collect()
}

/// Encode a map, writing `None` values as `null`.
pub(crate) fn encode_map<T, C: Codec<T> + ?Sized>(
    codec: &C,
    entries: &IndexMap<String, Option<T>>,
) -> Map<String, Value> {
    entries
        .iter()
        .map(|(key, item)| {
            let node = match item {
                Some(value) => codec.encode(value),
                None => Value::Null,
            };
            (key.clone(), node)
        })
        .collect()
}

/// Decode a map; `null` becomes `None`, undecodable entries are dropped.
pub(crate) fn decode_map<T, C: Codec<T> + ?Sized>(
    codec: &C,
    entries: &Map<String, Value>,
) -> IndexMap<String, Option<T>> {
    entries
        .iter()
        .filter_map(|(key, node)| {
            if node.is_null() {
                return Some((key.clone(), None));
            }
            match codec.decode(node) {
                Some(value) => Some((key.clone(), Some(value))),
                None => {
                    debug!("dropping undecodable map entry `{key}`");
                    None
                }
            }
        })
        .collect()
}
