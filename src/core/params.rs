//! Parameter values carried alongside a state.
//!
//! `Params` is the open key/value payload tracked by the router. `Query` is
//! the incoming side of a transition, where a key may be explicitly cleared
//! (`None`), which the reconciler treats the same as an absent key.

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// A single parameter value: either text or a number.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Text(String),
    Number(f64),
}

impl ParamValue {
    /// Borrow the text value, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Number(_) => None,
        }
    }

    /// Equality that treats a number as identical to itself bit for bit,
    /// so an unchanged `NaN` is not reported as a change.
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }

    /// Get the numeric value, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Text(_) => None,
            Self::Number(n) => Some(*n),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            // f64's Display already drops the fraction of whole numbers.
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

// Human-readable formats (JSON config, URL-ish snapshots) see a bare string or
// number. Compact formats such as bincode cannot self-describe, so they get an
// explicit variant tag.
#[derive(Serialize)]
enum TaggedRef<'a> {
    Text(&'a str),
    Number(f64),
}

#[derive(Deserialize)]
enum Tagged {
    Text(String),
    Number(f64),
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            match self {
                Self::Text(text) => serializer.serialize_str(text),
                Self::Number(n) => serializer.serialize_f64(*n),
            }
        } else {
            match self {
                Self::Text(text) => TaggedRef::Text(text).serialize(serializer),
                Self::Number(n) => TaggedRef::Number(*n).serialize(serializer),
            }
        }
    }
}

struct ParamValueVisitor;

impl<'de> Visitor<'de> for ParamValueVisitor {
    type Value = ParamValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or a number")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<ParamValue, E> {
        Ok(ParamValue::Text(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<ParamValue, E> {
        Ok(ParamValue::Text(value))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<ParamValue, E> {
        Ok(ParamValue::Number(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<ParamValue, E> {
        Ok(ParamValue::Number(value as f64))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<ParamValue, E> {
        Ok(ParamValue::Number(value as f64))
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(ParamValueVisitor)
        } else {
            Ok(match Tagged::deserialize(deserializer)? {
                Tagged::Text(text) => ParamValue::Text(text),
                Tagged::Number(n) => ParamValue::Number(n),
            })
        }
    }
}

/// Open mapping from parameter key to value.
///
/// Keys are dynamic: any transition may introduce a new one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ParamValue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shallow override of these params by `extra`.
    ///
    /// Keys in `extra` win on collision. An explicit `None` in `extra` is kept
    /// so the reconciler can clear that key back to its default.
    ///
    /// # Example
    ///
    /// ```rust
    /// use waymark::core::{ParamValue, Params, Query};
    ///
    /// let current = Params::new().with("q", "1").with("page", 2);
    /// let merged = current.merge(&Query::new().set("q", "2").clear("page"));
    ///
    /// assert_eq!(merged.get("q"), Some(&Some(ParamValue::from("2"))));
    /// assert_eq!(merged.get("page"), Some(&None));
    /// ```
    pub fn merge(&self, extra: &Query) -> Query {
        let mut merged = Query::from(self.clone());
        for (key, value) in extra.iter() {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

impl FromIterator<(String, ParamValue)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Params {
    type Item = (String, ParamValue);
    type IntoIter = btree_map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = btree_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Incoming parameters for a transition.
///
/// `None` marks a key as null/undefined, which clears it to its start default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(BTreeMap<String, Option<ParamValue>>);

impl Query {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style: set `key` to `value`.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(key.into(), Some(value.into()));
        self
    }

    /// Builder-style: mark `key` as cleared.
    pub fn clear(mut self, key: impl Into<String>) -> Self {
        self.0.insert(key.into(), None);
        self
    }

    pub fn insert(&mut self, key: String, value: Option<ParamValue>) -> Option<Option<ParamValue>> {
        self.0.insert(key, value)
    }

    /// Look up a key. The outer `Option` is presence, the inner one is null.
    pub fn get(&self, key: &str) -> Option<&Option<ParamValue>> {
        self.0.get(key)
    }

    /// Remove and return a key, consuming it from the incoming set.
    pub fn take(&mut self, key: &str) -> Option<Option<ParamValue>> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Option<ParamValue>> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drop cleared keys, keeping only concrete values.
    pub fn compact(&self) -> Params {
        self.0
            .iter()
            .filter_map(|(key, value)| value.clone().map(|v| (key.clone(), v)))
            .collect()
    }
}

impl From<Params> for Query {
    fn from(params: Params) -> Self {
        Self(params.into_iter().map(|(k, v)| (k, Some(v))).collect())
    }
}

impl FromIterator<(String, Option<ParamValue>)> for Query {
    fn from_iter<I: IntoIterator<Item = (String, Option<ParamValue>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Query {
    type Item = (String, Option<ParamValue>);
    type IntoIter = btree_map::IntoIter<String, Option<ParamValue>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
