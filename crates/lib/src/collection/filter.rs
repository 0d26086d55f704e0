//! Filtered views over record collections.

use std::str::FromStr;

use super::{BoxedCursor, CollectionError, RecordCollection, RecordCursor};
use crate::{
    Result,
    record::{Record, Value},
};

/// Predicate deciding whether a record is part of a filtered view.
///
/// Implemented for any `Fn(&R) -> bool`.
pub trait Filter<R> {
    fn matches(&self, record: &R) -> bool;
}

impl<R, F> Filter<R> for F
where
    F: Fn(&R) -> bool,
{
    fn matches(&self, record: &R) -> bool {
        self(record)
    }
}

/// Accepts records having `value` among the values of `property`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyFilter {
    property: String,
    value: Value,
}

impl PropertyFilter {
    pub fn new(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Filter<Record> for PropertyFilter {
    fn matches(&self, record: &Record) -> bool {
        record.values(&self.property).contains(&self.value)
    }
}

/// Parses `property=value`.
///
/// The value is read as a JSON scalar when possible (`42`, `true`, `null`,
/// `"quoted"`), otherwise taken verbatim as text.
impl FromStr for PropertyFilter {
    type Err = crate::Error;

    fn from_str(expression: &str) -> Result<Self> {
        let (property, raw) =
            expression
                .split_once('=')
                .ok_or_else(|| CollectionError::InvalidFilter {
                    expression: expression.to_string(),
                    reason: "expected 'property=value'".to_string(),
                })?;
        let property = property.trim();
        if property.is_empty() {
            return Err(CollectionError::InvalidFilter {
                expression: expression.to_string(),
                reason: "property name is empty".to_string(),
            }
            .into());
        }
        let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::from(raw));
        Ok(Self::new(property, value))
    }
}

/// A read-only view over another collection, restricted by a [`Filter`].
///
/// The view has no exact size; reference operations delegate to the source.
pub struct Filtered<'a, C, F> {
    source: &'a C,
    filter: F,
}

impl<'a, C, F> Filtered<'a, C, F>
where
    C: RecordCollection,
    F: Filter<C::Record>,
{
    pub fn new(source: &'a C, filter: F) -> Self {
        Self { source, filter }
    }
}

impl<C, F> RecordCollection for Filtered<'_, C, F>
where
    C: RecordCollection,
    F: Filter<C::Record>,
{
    type Record = C::Record;
    type Ref = C::Ref;

    fn name(&self) -> &str {
        self.source.name()
    }

    fn cursor(&self) -> Result<BoxedCursor<'_, Self::Record>> {
        let inner = self.source.cursor()?;
        Ok(Box::new(FilteredCursor {
            inner,
            filter: &self.filter,
        }))
    }

    fn reference(&self, record: &Self::Record) -> Result<Self::Ref> {
        self.source.reference(record)
    }

    fn resolve(&self, reference: &Self::Ref) -> Result<Option<Self::Record>> {
        self.source.resolve(reference)
    }

    fn detach(&self, record: Self::Record) -> Self::Record {
        self.source.detach(record)
    }
}

/// Cursor of a [`Filtered`] view. Errors from the source pass through.
pub struct FilteredCursor<'a, R, F> {
    inner: BoxedCursor<'a, R>,
    filter: &'a F,
}

impl<R, F> Iterator for FilteredCursor<'_, R, F>
where
    F: Filter<R>,
{
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(record) if !self.filter.matches(&record) => continue,
                item => return Some(item),
            }
        }
    }
}

impl<R, F> RecordCursor for FilteredCursor<'_, R, F>
where
    F: Filter<R>,
{
    fn close(&mut self) {
        self.inner.close();
    }
}
