//! Named parameter storage.

use crate::value::Value;
use std::collections::HashMap;

/// Bound parameter values keyed by placeholder name.
///
/// Keys are stored as given. Lookups accept the name with or without the
/// leading `:` so that `set_param("age", ..)` and `set_param(":age", ..)` both
/// satisfy a `:age` placeholder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    values: HashMap<String, Value>,
}

impl Params {
    /// Create a new empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Look up a parameter by placeholder name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let bare = name.strip_prefix(':').unwrap_or(name);
        self.values
            .get(bare)
            .or_else(|| self.values.get(&format!(":{bare}")))
    }

    /// Check whether a value is bound for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Get the number of bound parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no parameters are bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
