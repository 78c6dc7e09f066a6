use std::collections::{BTreeMap, btree_map};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// The answers a caller has given so far, keyed by context key.
///
/// A context is what [`ContentBuilder::filter`](crate::ContentBuilder::filter)
/// evaluates dependency rules against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(BTreeMap<String, Value>);

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the context with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key` to `value`, returning the previous value if there was one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Returns the value for `key`, if defined.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether the context defines no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the defined keys and values in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, Value>> for Context {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl<'a> IntoIterator for &'a Context {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Error returned when a `key=value` pair cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParsePairError {
    /// The input contains no `=`.
    #[error("expected KEY=VALUE, found '{0}'")]
    MissingSeparator(String),
    /// The key is empty.
    #[error("empty key in '{0}'")]
    EmptyKey(String),
}

/// Parses a `key=value` pair into a context entry.
///
/// The value is read as a YAML scalar, so `count=2` yields a number and
/// `lot=SaaS` a string. A value that is not valid YAML is kept verbatim as a
/// string.
///
/// # Errors
///
/// Returns an error if there is no `=` or the key is empty.
pub fn parse_pair(input: &str) -> Result<(String, Value), ParsePairError> {
    let (key, raw) = input
        .split_once('=')
        .ok_or_else(|| ParsePairError::MissingSeparator(input.to_string()))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(ParsePairError::EmptyKey(input.to_string()));
    }

    let value = match serde_yaml::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_) | Value::String(_))) => value,
        _ => Value::String(raw.to_string()),
    };

    Ok((key.to_string(), value))
}
