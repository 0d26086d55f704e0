//! Read-only record collections.
//!
//! This module defines the `RecordCollection` trait, the contract shared by
//! every source and every derived view in the crate:
//!
//! * forward-only, closable iteration through a [`RecordCursor`]
//! * reference-by-value lookup ([`RecordCollection::reference`])
//! * value-by-reference lookup ([`RecordCollection::resolve`])
//! * an optional exact size
//! * filtering into another collection with the same contract
//!
//! Because a merged view implements the same trait as its source, views can be
//! nested (merged again, filtered, merged again) without special-casing.

mod errors;
mod filter;
mod memory;

pub use errors::CollectionError;
pub use filter::{Filter, Filtered, FilteredCursor, PropertyFilter};
pub use memory::{MemoryCollection, MemoryCursor};

use crate::Result;
use std::fmt::Debug;
use std::hash::Hash;

/// A forward-only, closable sequence of records.
///
/// Cursors yield `Result` items: an `Err` item reports a failure of that step.
/// `close()` releases whatever the cursor holds and is idempotent; a closed
/// cursor yields `None`. Implementations also close on drop.
pub trait RecordCursor: Iterator {
    /// Releases the resources held by this cursor.
    fn close(&mut self);

    /// Removes the record last returned by the cursor.
    ///
    /// Collections in this crate are read-only, so the default implementation
    /// always fails with [`CollectionError::UnsupportedOperation`].
    fn remove(&mut self) -> Result<()> {
        Err(CollectionError::UnsupportedOperation {
            operation: "remove".to_string(),
        }
        .into())
    }
}

/// Boxed cursor yielding records of type `R`, borrowed from its collection.
pub type BoxedCursor<'a, R> = Box<dyn RecordCursor<Item = Result<R>> + 'a>;

/// Read contract of a record collection.
///
/// References returned by [`reference`](Self::reference) are only valid for
/// [`resolve`](Self::resolve) on the same collection.
pub trait RecordCollection {
    /// The record type yielded by this collection.
    type Record;

    /// Opaque handle identifying a record within this collection.
    type Ref: Clone + Eq + Hash + Debug;

    /// Human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Opens a fresh cursor over the collection.
    fn cursor(&self) -> Result<BoxedCursor<'_, Self::Record>>;

    /// Returns the reference of a record that originated from this collection.
    fn reference(&self, record: &Self::Record) -> Result<Self::Ref>;

    /// Resolves a reference to its live record.
    ///
    /// Returns `Ok(None)` if the slot behind the reference no longer holds a
    /// record.
    fn resolve(&self, reference: &Self::Ref) -> Result<Option<Self::Record>>;

    /// Strips the identity of this collection from a record it yielded.
    ///
    /// Views call this on every record they synthesize, so that
    /// [`reference`](Self::reference) rejects it even when it was derived from
    /// a source record. The default returns the record unchanged, which only
    /// suits collections whose records carry no identity.
    fn detach(&self, record: Self::Record) -> Self::Record {
        record
    }

    /// Exact number of records, if known without iterating.
    fn size(&self) -> Option<usize> {
        None
    }

    /// Returns true if the collection yields no records.
    ///
    /// Uses [`size`](Self::size) when available, otherwise probes a cursor for
    /// its first element.
    fn is_empty(&self) -> Result<bool> {
        if let Some(size) = self.size() {
            return Ok(size == 0);
        }
        let mut cursor = self.cursor()?;
        let first = cursor.next().transpose();
        cursor.close();
        Ok(first?.is_none())
    }

    /// Returns a read-only view yielding only records accepted by `filter`.
    fn select<F>(&self, filter: F) -> Filtered<'_, Self, F>
    where
        Self: Sized,
        F: Filter<Self::Record>,
    {
        Filtered::new(self, filter)
    }
}
