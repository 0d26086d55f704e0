//! The lazy merged view.

use indexmap::IndexSet;
use tracing::{debug, error, trace};

use super::{MergeError, MergeHandler, MergeIndex, MergeParameters};
use crate::{
    Result,
    collection::{BoxedCursor, RecordCollection, RecordCursor},
    log::TransformationLog,
};

/// A read-only collection yielding one merged record per group of a
/// [`MergeIndex`].
///
/// Nothing is merged when the view is created. Each step of a cursor resolves
/// the references of one group against the source and hands the records to the
/// handler's [`merge`](MergeHandler::merge). Results are not cached: every
/// cursor is an independent pass that resolves and merges every group again.
///
/// The view borrows its source for its whole lifetime. If a record is removed
/// from the source after indexing, iterating its group fails with
/// [`MergeError::UnresolvedReference`] instead of producing a partial merge.
pub struct MergedCollection<'a, C, H>
where
    C: RecordCollection,
    H: MergeHandler<C::Record>,
{
    operation: String,
    index: MergeIndex<H::Key, C::Ref>,
    source: &'a C,
    handler: &'a H,
    config: H::Config,
}

impl<'a, C, H> MergedCollection<'a, C, H>
where
    C: RecordCollection,
    H: MergeHandler<C::Record>,
{
    /// Runs configuration and indexing for one merge operation.
    pub(crate) fn build(
        handler: &'a H,
        source: &'a C,
        parameters: &MergeParameters,
        log: &dyn TransformationLog,
    ) -> Result<Self> {
        let operation = parameters.identifier().to_string();

        let config =
            handler
                .configure(parameters, log)
                .map_err(|err| MergeError::Configuration {
                    operation: operation.clone(),
                    source: Box::new(err),
                })?;
        debug!(operation = %operation, "Merge configured");

        let index = MergeIndex::build(source, |record| handler.merge_key(record, &config))?;
        debug!(
            operation = %operation,
            records = index.record_count(),
            groups = index.len(),
            "Merge indexed"
        );

        Ok(Self {
            operation,
            index,
            source,
            handler,
            config,
        })
    }

    /// Identifier of the merge operation that produced this view.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn index(&self) -> &MergeIndex<H::Key, C::Ref> {
        &self.index
    }

    pub fn config(&self) -> &H::Config {
        &self.config
    }

    /// The collection this view was built over.
    pub fn source(&self) -> &'a C {
        self.source
    }
}

impl<C, H> RecordCollection for MergedCollection<'_, C, H>
where
    C: RecordCollection,
    H: MergeHandler<C::Record>,
{
    type Record = C::Record;
    type Ref = C::Ref;

    fn name(&self) -> &str {
        &self.operation
    }

    fn cursor(&self) -> Result<BoxedCursor<'_, Self::Record>> {
        trace!(operation = %self.operation, groups = self.index.len(), "Opening merged cursor");
        Ok(Box::new(MergedCursor {
            operation: &self.operation,
            groups: self.index.iter(),
            source: self.source,
            handler: self.handler,
            config: &self.config,
            done: false,
        }))
    }

    /// Delegates to the source. Merged records are detached from the source
    /// before they are yielded, so the source rejects them.
    fn reference(&self, record: &Self::Record) -> Result<Self::Ref> {
        self.source.reference(record)
    }

    fn resolve(&self, reference: &Self::Ref) -> Result<Option<Self::Record>> {
        self.source.resolve(reference)
    }

    fn detach(&self, record: Self::Record) -> Self::Record {
        self.source.detach(record)
    }

    /// Number of groups, not of source records.
    fn size(&self) -> Option<usize> {
        Some(self.index.len())
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.index.is_empty())
    }
}

/// One pass over a [`MergedCollection`].
///
/// After the first failing group the cursor is fused and yields `None`.
pub struct MergedCursor<'a, C, H>
where
    C: RecordCollection,
    H: MergeHandler<C::Record>,
{
    operation: &'a str,
    groups: indexmap::map::Iter<'a, H::Key, IndexSet<C::Ref>>,
    source: &'a C,
    handler: &'a H,
    config: &'a H::Config,
    done: bool,
}

impl<C, H> MergedCursor<'_, C, H>
where
    C: RecordCollection,
    H: MergeHandler<C::Record>,
{
    fn merge_group(&self, key: &H::Key, references: &IndexSet<C::Ref>) -> Result<C::Record> {
        let mut records = Vec::with_capacity(references.len());
        for reference in references {
            let record = self.source.resolve(reference)?.ok_or_else(|| {
                error!(
                    operation = self.operation,
                    reference = ?reference,
                    key = ?key,
                    "Indexed reference no longer resolves"
                );
                MergeError::UnresolvedReference {
                    operation: self.operation.to_string(),
                    key: format!("{key:?}"),
                    reference: format!("{reference:?}"),
                }
            })?;
            records.push(record);
        }

        trace!(operation = self.operation, key = ?key, members = records.len(), "Merging group");
        // A reducer may hand back a member record; its source identity must not
        // leak into the output
        self.handler
            .merge(records, key, self.config)
            .map(|merged| self.source.detach(merged))
            .map_err(|err| {
                MergeError::Reduction {
                    operation: self.operation.to_string(),
                    key: format!("{key:?}"),
                    source: Box::new(err),
                }
                .into()
            })
    }
}

impl<C, H> Iterator for MergedCursor<'_, C, H>
where
    C: RecordCollection,
    H: MergeHandler<C::Record>,
{
    type Item = Result<C::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let (key, references) = self.groups.next()?;
        match self.merge_group(key, references) {
            Ok(record) => Some(Ok(record)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, Some(self.groups.len()))
        }
    }
}

impl<C, H> RecordCursor for MergedCursor<'_, C, H>
where
    C: RecordCollection,
    H: MergeHandler<C::Record>,
{
    fn close(&mut self) {
        self.done = true;
    }
}
