//! The pluggable merge strategy.

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use super::{MergeParameters, MergedCollection};
use crate::{Result, collection::RecordCollection, log::TransformationLog};

/// Strategy deciding how records of type `R` are grouped and merged.
///
/// A merge operation calls [`configure`](Self::configure) exactly once, then
/// [`merge_key`](Self::merge_key) once per source record while building the
/// index, and finally [`merge`](Self::merge) once per group each time the
/// merged view is iterated. The same configuration value is passed to every
/// call of one operation.
///
/// `merge_key` must be deterministic: the same record and configuration must
/// always yield equal keys. Neither `merge_key` nor `merge` may have side
/// effects on their inputs.
pub trait MergeHandler<R> {
    /// Typed configuration derived from the merge parameters.
    type Config;

    /// Grouping key; records with equal keys are merged together.
    type Key: Eq + Hash + Debug;

    /// Derives the configuration for one merge operation.
    ///
    /// Non-fatal issues (for example a default applied for an absent
    /// parameter) should be reported to `log` instead of failing.
    fn configure(
        &self,
        parameters: &MergeParameters,
        log: &dyn TransformationLog,
    ) -> Result<Self::Config>;

    /// Computes the merge key of a record.
    fn merge_key(&self, record: &R, config: &Self::Config) -> Result<Self::Key>;

    /// Merges the members of one group into a single record.
    ///
    /// `records` is never empty when called by the engine and holds one
    /// record per distinct reference in the group.
    fn merge(&self, records: Vec<R>, key: &Self::Key, config: &Self::Config) -> Result<R>;

    /// Configures this handler, indexes `source`, and returns the lazy merged
    /// view.
    ///
    /// Fails before any indexing if configuration fails, and without
    /// returning a view if key extraction fails. No record is merged until the
    /// view is iterated.
    fn merge_instances<'a, C>(
        &'a self,
        source: &'a C,
        parameters: &MergeParameters,
        log: &dyn TransformationLog,
    ) -> Result<MergedCollection<'a, C, Self>>
    where
        Self: Sized,
        C: RecordCollection<Record = R>,
    {
        MergedCollection::build(self, source, parameters, log)
    }
}

/// A [`MergeHandler`] assembled from three closures.
///
/// ```
/// use coalesce::{
///     MemoryCollection, Record, RecordCollection,
///     log::MemoryLog,
///     merge::{FnMergeHandler, MergeHandler, MergeParameters},
/// };
///
/// let source = MemoryCollection::from_records([
///     Record::new("Road").with_property("name", "A1"),
///     Record::new("Road").with_property("name", "A1"),
/// ]);
/// let handler = FnMergeHandler::new(
///     |_, _| Ok(()),
///     |record: &Record, _: &()| Ok(record.first("name").cloned()),
///     |records: Vec<Record>, _key: &Option<coalesce::Value>, _: &()| {
///         Ok(records.into_iter().next().unwrap_or_else(|| Record::new("Road")))
///     },
/// );
/// let merged = handler
///     .merge_instances(&source, &MergeParameters::new("dedup"), &MemoryLog::new())
///     .unwrap();
/// assert_eq!(merged.size(), Some(1));
/// ```
pub struct FnMergeHandler<T, K, CF, KF, MF> {
    configure: CF,
    key: KF,
    merge: MF,
    _types: PhantomData<fn() -> (T, K)>,
}

impl<T, K, CF, KF, MF> FnMergeHandler<T, K, CF, KF, MF> {
    pub fn new<R>(configure: CF, key: KF, merge: MF) -> Self
    where
        CF: Fn(&MergeParameters, &dyn TransformationLog) -> Result<T>,
        KF: Fn(&R, &T) -> Result<K>,
        MF: Fn(Vec<R>, &K, &T) -> Result<R>,
    {
        Self {
            configure,
            key,
            merge,
            _types: PhantomData,
        }
    }
}

impl<R, T, K, CF, KF, MF> MergeHandler<R> for FnMergeHandler<T, K, CF, KF, MF>
where
    K: Eq + Hash + Debug,
    CF: Fn(&MergeParameters, &dyn TransformationLog) -> Result<T>,
    KF: Fn(&R, &T) -> Result<K>,
    MF: Fn(Vec<R>, &K, &T) -> Result<R>,
{
    type Config = T;
    type Key = K;

    fn configure(&self, parameters: &MergeParameters, log: &dyn TransformationLog) -> Result<T> {
        (self.configure)(parameters, log)
    }

    fn merge_key(&self, record: &R, config: &T) -> Result<K> {
        (self.key)(record, config)
    }

    fn merge(&self, records: Vec<R>, key: &K, config: &T) -> Result<R> {
        (self.merge)(records, key, config)
    }
}
