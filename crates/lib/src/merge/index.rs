//! The merge index: merge key to the set of member references.

use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};
use tracing::{info, warn};

use super::MergeError;
use crate::{
    Result,
    collection::{BoxedCursor, RecordCollection},
};

/// Immutable mapping from merge key to the distinct references sharing it.
///
/// Built in one pass over a source collection. Groups and their members are
/// kept in first-seen order so repeated runs over the same source produce the
/// same iteration order; consumers must only rely on every group appearing
/// exactly once. Every group holds at least one reference.
#[derive(Debug, Clone)]
pub struct MergeIndex<K, R> {
    groups: IndexMap<K, IndexSet<R>>,
    /// Records seen while scanning, including repeated references
    records: usize,
}

impl<K, R> MergeIndex<K, R>
where
    K: Eq + Hash,
    R: Eq + Hash,
{
    /// Scans `source` once, grouping the reference of every record under the
    /// key computed by `extract`.
    ///
    /// The scan cursor is closed whether the scan succeeds or fails. A failing
    /// key extraction aborts the build with [`MergeError::KeyExtraction`]; no
    /// partial index is returned.
    pub fn build<C, F>(source: &C, mut extract: F) -> Result<Self>
    where
        C: RecordCollection<Ref = R>,
        F: FnMut(&C::Record) -> Result<K>,
    {
        let mut cursor = source.cursor()?;
        let scanned = Self::scan(source, &mut cursor, &mut extract);
        cursor.close();

        match &scanned {
            Ok(index) => info!(
                collection = source.name(),
                records = index.records,
                groups = index.groups.len(),
                "Merge index built"
            ),
            Err(err) => warn!(collection = source.name(), error = %err, "Merge index build aborted"),
        }
        scanned
    }

    fn scan<C, F>(
        source: &C,
        cursor: &mut BoxedCursor<'_, C::Record>,
        extract: &mut F,
    ) -> Result<Self>
    where
        C: RecordCollection<Ref = R>,
        F: FnMut(&C::Record) -> Result<K>,
    {
        let mut groups: IndexMap<K, IndexSet<R>> = IndexMap::new();
        let mut records = 0;

        for item in cursor {
            let record = item?;
            let key = extract(&record).map_err(|err| MergeError::KeyExtraction {
                collection: source.name().to_string(),
                position: records,
                source: Box::new(err),
            })?;
            let reference = source.reference(&record)?;
            groups.entry(key).or_default().insert(reference);
            records += 1;
        }

        Ok(Self { groups, records })
    }

    /// Member references of the group for `key`.
    pub fn get(&self, key: &K) -> Option<&IndexSet<R>> {
        self.groups.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.groups.contains_key(key)
    }
}

impl<K, R> MergeIndex<K, R> {
    /// Number of distinct keys, i.e. output groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of records scanned while building the index.
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Distinct keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.groups.keys()
    }

    /// Groups with their member references, in first-seen order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, K, IndexSet<R>> {
        self.groups.iter()
    }
}

impl<'a, K, R> IntoIterator for &'a MergeIndex<K, R> {
    type Item = (&'a K, &'a IndexSet<R>);
    type IntoIter = indexmap::map::Iter<'a, K, IndexSet<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}
