//! In-memory record collection.
//!
//! `MemoryCollection` is an arena of record slots. References are
//! `(store id, slot)` pairs, so resolution is a bounds check plus a clone, and a
//! reference issued by one collection is rejected by every other one.

use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::warn;

use super::{BoxedCursor, CollectionError, RecordCollection, RecordCursor};
use crate::{
    Result,
    record::{Record, RecordRef, StoreId},
};

const DEFAULT_NAME: &str = "memory";

/// A simple in-memory record store backed by a slot vector.
///
/// Removing a record leaves its slot empty, so references to other records
/// stay valid. Reads take a short-lived read lock per step; no lock is held
/// between cursor steps.
#[derive(Debug)]
pub struct MemoryCollection {
    id: StoreId,
    name: String,
    /// Record slots; `None` marks a removed record
    slots: RwLock<Vec<Option<Record>>>,
    /// Number of cursors opened and not yet closed
    open_cursors: AtomicUsize,
}

impl MemoryCollection {
    /// Creates a new, empty collection.
    pub fn new() -> Self {
        Self::named(DEFAULT_NAME)
    }

    /// Creates a new, empty collection with a diagnostic name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: StoreId::generate(),
            name: name.into(),
            slots: RwLock::new(Vec::new()),
            open_cursors: AtomicUsize::new(0),
        }
    }

    /// Creates a collection holding the given records, in order.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let slots = records
            .into_iter()
            .map(|mut record| {
                record.set_origin(None);
                Some(record)
            })
            .collect();
        Self {
            slots: RwLock::new(slots),
            ..Self::new()
        }
    }

    /// The id stamped on every reference this collection issues.
    pub fn id(&self) -> StoreId {
        self.id
    }

    /// Stores a record in a new slot and returns its reference.
    ///
    /// Any origin the record carried is discarded.
    pub fn insert(&self, mut record: Record) -> Result<RecordRef> {
        record.set_origin(None);
        let mut slots = self.write_slots()?;
        let slot = slots.len();
        slots.push(Some(record));
        Ok(RecordRef::new(self.id, slot))
    }

    /// Removes the record behind `reference`, leaving its slot empty.
    ///
    /// Returns the removed record, or `None` if the slot was already empty.
    pub fn remove(&self, reference: &RecordRef) -> Result<Option<Record>> {
        self.check_owner(reference)?;
        let mut slots = self.write_slots()?;
        Ok(slots.get_mut(reference.slot()).and_then(Option::take))
    }

    /// Number of stored records, excluding empty slots.
    pub fn len(&self) -> Result<usize> {
        let slots = self.read_slots()?;
        Ok(slots.iter().filter(|slot| slot.is_some()).count())
    }

    /// Number of cursors currently open over this collection.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    fn check_owner(&self, reference: &RecordRef) -> Result<()> {
        if reference.store() != self.id {
            return Err(CollectionError::ForeignReference {
                reference: reference.to_string(),
                collection: self.name.clone(),
            }
            .into());
        }
        Ok(())
    }

    fn read_slots(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<Option<Record>>>> {
        self.slots.read().map_err(|_| {
            CollectionError::LockPoisoned {
                collection: self.name.clone(),
            }
            .into()
        })
    }

    fn write_slots(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<Option<Record>>>> {
        self.slots.write().map_err(|_| {
            CollectionError::LockPoisoned {
                collection: self.name.clone(),
            }
            .into()
        })
    }

    /// Returns the first live record at or after `slot`, with its origin set.
    fn next_live(&self, slot: usize) -> Result<Option<(usize, Record)>> {
        let slots = self.read_slots()?;
        Ok(slots
            .iter()
            .enumerate()
            .skip(slot)
            .find_map(|(index, entry)| {
                entry.as_ref().map(|record| {
                    let mut record = record.clone();
                    record.set_origin(Some(RecordRef::new(self.id, index)));
                    (index, record)
                })
            }))
    }
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Record> for MemoryCollection {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}

impl RecordCollection for MemoryCollection {
    type Record = Record;
    type Ref = RecordRef;

    fn name(&self) -> &str {
        &self.name
    }

    fn cursor(&self) -> Result<BoxedCursor<'_, Record>> {
        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryCursor {
            collection: self,
            next_slot: 0,
            closed: false,
        }))
    }

    fn reference(&self, record: &Record) -> Result<RecordRef> {
        let reference = record
            .origin()
            .ok_or_else(|| CollectionError::NotAddressable {
                collection: self.name.clone(),
                reason: format!(
                    "record of type '{}' was not read from a collection",
                    record.type_name()
                ),
            })?;
        self.check_owner(&reference)?;
        Ok(reference)
    }

    fn resolve(&self, reference: &RecordRef) -> Result<Option<Record>> {
        self.check_owner(reference)?;
        let slots = self.read_slots()?;
        Ok(slots
            .get(reference.slot())
            .and_then(Option::as_ref)
            .map(|record| {
                let mut record = record.clone();
                record.set_origin(Some(*reference));
                record
            }))
    }

    fn detach(&self, mut record: Record) -> Record {
        record.set_origin(None);
        record
    }

    /// `None` when the slots cannot be read; the failure is logged.
    fn size(&self) -> Option<usize> {
        match self.len() {
            Ok(len) => Some(len),
            Err(err) => {
                warn!(collection = %self.name, error = %err, "Size unavailable");
                None
            }
        }
    }
}

/// Cursor over a [`MemoryCollection`], in slot order.
pub struct MemoryCursor<'a> {
    collection: &'a MemoryCollection,
    next_slot: usize,
    closed: bool,
}

impl Iterator for MemoryCursor<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        match self.collection.next_live(self.next_slot) {
            Ok(Some((slot, record))) => {
                self.next_slot = slot + 1;
                Some(Ok(record))
            }
            Ok(None) => None,
            Err(err) => {
                self.close();
                Some(Err(err))
            }
        }
    }
}

impl RecordCursor for MemoryCursor<'_> {
    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.collection.open_cursors.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for MemoryCursor<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
