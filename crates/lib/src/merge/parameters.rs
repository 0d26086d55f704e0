//! Inputs of a merge operation supplied by the transformation configuration.

use std::collections::BTreeMap;

/// An ordered string multimap. Keys may repeat; insertion order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListMultimap {
    entries: Vec<(String, String)>,
}

impl ListMultimap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// All values stored under `key`, in insertion order.
    pub fn get<'a, 'k>(&'a self, key: &'k str) -> impl Iterator<Item = &'a str> + use<'a, 'k> {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The first value stored under `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).next()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Number of key/value pairs, counting repeated keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for ListMultimap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Everything a handler may consult to build its merge configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeParameters {
    /// Identifier of the transformation running the merge
    identifier: String,
    /// Transformation parameters; names may repeat
    transformation: ListMultimap,
    /// Execution parameters; names are unique
    execution: BTreeMap<String, String>,
}

impl MergeParameters {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    /// Appends a transformation parameter, builder style.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.transformation.insert(name, value);
        self
    }

    /// Sets an execution parameter, builder style. A later value for the same
    /// name replaces the earlier one.
    pub fn with_execution_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.execution.insert(name.into(), value.into());
        self
    }

    /// Replaces all transformation parameters, builder style.
    pub fn with_parameters(mut self, parameters: ListMultimap) -> Self {
        self.transformation = parameters;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn transformation(&self) -> &ListMultimap {
        &self.transformation
    }

    pub fn execution(&self) -> &BTreeMap<String, String> {
        &self.execution
    }

    /// Looks up a single execution parameter.
    pub fn execution_parameter(&self, name: &str) -> Option<&str> {
        self.execution.get(name).map(String::as_str)
    }
}
