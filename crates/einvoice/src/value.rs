//! Dynamic mapping types produced by the envelope parser
//!
//! The shape of an invoice document is decided at runtime, so the output
//! is a tagged union: a leaf element becomes a [`Value::Scalar`], an
//! element with children becomes a [`Value::Object`], and repeated
//! same-named siblings become a [`Value::List`]. Key order follows
//! document order.

use indexmap::map::{Entry, IntoIter, Iter, Keys, Values};
use indexmap::IndexMap;
use std::ops::Index;

/// A value extracted from an invoice document
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Trimmed text content of a leaf element
    Scalar(String),
    /// Nested mapping of a structured element
    Object(FieldMap),
    /// Repeated same-named siblings, in document order
    List(Vec<Value>),
}

impl Value {
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Scalar content, `None` for objects and lists
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&FieldMap> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Field of a nested object, `None` for other variants
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Descend through nested objects along `path`
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        path.iter()
            .try_fold(self, |current, key| current.get(key))
    }

    /// View any value as a slice of occurrences: a list yields its items,
    /// everything else a one-element slice of itself. This is the
    /// sequence-vs-scalar bridge for consumers that iterate repeated
    /// elements without knowing the sibling count up front.
    pub fn occurrences(&self) -> &[Value] {
        match self {
            Self::List(items) => items,
            single => std::slice::from_ref(single),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_owned())
    }
}

impl From<FieldMap> for Value {
    fn from(value: FieldMap) -> Self {
        Self::Object(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Self::List(values)
    }
}

/// Order-preserving mapping from field name to [`Value`]
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FieldMap(pub(crate) IndexMap<String, Value>);

impl FieldMap {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity(capacity))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Descend through nested objects along `path`
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        self.get(first)?.get_path(rest)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Insert preserving earlier same-named entries: a second occurrence
    /// turns the slot into a list, later ones append to it.
    pub fn aggregate(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let value = value.into();
        match self.0.entry(key.into()) {
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Value::List(items) => items.push(value),
                existing => {
                    let first = std::mem::replace(existing, Value::List(Vec::with_capacity(2)));
                    if let Value::List(items) = existing {
                        items.push(first);
                        items.push(value);
                    }
                }
            },
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.swap_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> Keys<'_, String, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> Values<'_, String, Value> {
        self.0.values()
    }

    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl Index<&str> for FieldMap {
    type Output = Value;

    #[allow(clippy::indexing_slicing)]
    fn index(&self, key: &str) -> &Self::Output {
        &self.0[key]
    }
}

impl<'a> IntoIterator for &'a FieldMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, Value);
    type IntoIter = IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, Value)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(IndexMap::from_iter(iter))
    }
}

impl From<IndexMap<String, Value>> for FieldMap {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::{FieldMap, Value};
    use serde::ser::{SerializeMap, SerializeSeq};
    use serde::{Serialize, Serializer};

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Self::Scalar(s) => serializer.serialize_str(s),
                Self::Object(map) => map.serialize(serializer),
                Self::List(items) => {
                    let mut seq = serializer.serialize_seq(Some(items.len()))?;
                    for item in items {
                        seq.serialize_element(item)?;
                    }
                    seq.end()
                }
            }
        }
    }

    impl Serialize for FieldMap {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (key, value) in self {
                map.serialize_entry(key, value)?;
            }
            map.end()
        }
    }
}
