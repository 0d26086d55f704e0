//!
//! Coalesce: lazy group-by-then-merge views over record collections.
//! This library provides the core components for grouping the records of a
//! large collection by a computed key and exposing each group as one merged
//! record, computed only when requested.
//!
//! ## Core Concepts
//!
//! * **Collections (`collection::RecordCollection`)**: The read contract shared by sources and views: closable cursors, reference lookup in both directions, optional size, and filtering.
//! * **References**: Opaque handles into a collection. The in-memory arena (`collection::MemoryCollection`) issues `record::RecordRef`s that only it can resolve.
//! * **Merge handlers (`merge::MergeHandler`)**: The pluggable strategy deriving a configuration, computing merge keys, and merging a group into one record.
//! * **Merge index (`merge::MergeIndex`)**: The one-pass, immutable mapping from merge key to member references.
//! * **Merged collections (`merge::MergedCollection`)**: The lazy, read-only view yielding one merged record per group. It implements the same collection contract as its source, so views nest.
//! * **Transformation logs (`log::TransformationLog`)**: The sink for non-fatal diagnostics raised while configuring a merge.

pub mod collection;
pub mod constants;
pub mod log;
pub mod merge;
pub mod record;

pub use collection::{MemoryCollection, RecordCollection, RecordCursor};
pub use record::{Record, RecordRef, Value};

/// Result type used throughout the Coalesce library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Coalesce library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured collection errors from the collection module
    #[error(transparent)]
    Collection(collection::CollectionError),

    /// Structured merge errors from the merge module
    #[error(transparent)]
    Merge(merge::MergeError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Collection(_) => "collection",
            Error::Merge(_) => "merge",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error signals a violated caller contract, such as a
    /// removal through a read-only cursor.
    pub fn is_contract_violation(&self) -> bool {
        match self {
            Error::Collection(collection_err) => collection_err.is_contract_violation(),
            Error::Merge(merge_err) => merge_err.is_contract_violation(),
            _ => false,
        }
    }

    /// Check if this error indicates a broken data integrity invariant.
    pub fn is_integrity_error(&self) -> bool {
        match self {
            Error::Collection(collection_err) => collection_err.is_integrity_error(),
            Error::Merge(merge_err) => merge_err.is_integrity_error(),
            _ => false,
        }
    }

    /// Check if this error stems from unusable merge configuration.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Error::Merge(merge_err) => merge_err.is_configuration_error(),
            _ => false,
        }
    }

    /// Check if this error was raised by a merge strategy.
    pub fn is_strategy_error(&self) -> bool {
        match self {
            Error::Merge(merge_err) => merge_err.is_strategy_error(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Serialize(_))
    }
}
