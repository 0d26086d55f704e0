//! Record model used by the built-in collections and merge handlers.
//!
//! A `Record` is a typed bag of multi-valued properties. Its identity is not
//! part of its content: records read from a collection carry an origin
//! [`RecordRef`] assigned by that collection, while records produced by a merge
//! have no origin and are therefore not addressable.

mod value;

pub use value::Value;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Identifier of a record store.
///
/// References carry the id of the store that issued them, so a reference can
/// only ever be resolved against its own store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId(Uuid);

impl StoreId {
    /// Generates a fresh, random store id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle to a record slot in a store.
///
/// Cheap to copy and compare. Obtaining the record behind it requires a
/// resolution call against the issuing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordRef {
    store: StoreId,
    slot: usize,
}

impl RecordRef {
    pub(crate) fn new(store: StoreId, slot: usize) -> Self {
        Self { store, slot }
    }

    /// The store that issued this reference.
    pub fn store(&self) -> StoreId {
        self.store
    }

    /// Slot position inside the issuing store.
    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl std::fmt::Display for RecordRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.store, self.slot)
    }
}

/// A structured record: a type name plus multi-valued properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "type")]
    type_name: String,

    #[serde(default)]
    properties: BTreeMap<String, Vec<Value>>,

    /// Set by the store a record was read from
    #[serde(skip)]
    origin: Option<RecordRef>,
}

impl Record {
    /// Creates an empty record of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: BTreeMap::new(),
            origin: None,
        }
    }

    /// Appends a value to a property, builder style.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push_value(name, value);
        self
    }

    /// Replaces all values of a property, builder style.
    pub fn with_values(mut self, name: impl Into<String>, values: Vec<Value>) -> Self {
        self.set_values(name, values);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// All values of a property; empty if the property is absent.
    pub fn values(&self, name: &str) -> &[Value] {
        self.properties.get(name).map_or(&[], Vec::as_slice)
    }

    /// The first value of a property, if any.
    pub fn first(&self, name: &str) -> Option<&Value> {
        self.values(name).first()
    }

    /// Returns true if the property is present (even with zero values).
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Iterates over property names and their values in name order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.properties
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn push_value(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties
            .entry(name.into())
            .or_default()
            .push(value.into());
    }

    pub fn set_values(&mut self, name: impl Into<String>, values: Vec<Value>) {
        self.properties.insert(name.into(), values);
    }

    /// Reference of the slot this record was read from, if any.
    ///
    /// Records built by hand or produced by a merge have no origin.
    pub fn origin(&self) -> Option<RecordRef> {
        self.origin
    }

    pub(crate) fn set_origin(&mut self, origin: Option<RecordRef>) {
        self.origin = origin;
    }
}
