//! Error types for merge operations.
//!
//! Every failure of a merge operation surfaces synchronously to whoever drives
//! it: configuration and key extraction failures to the caller of
//! `merge_instances`, resolution and reduction failures to the consumer
//! iterating the merged view. None of them is retried.

use thiserror::Error;

/// Errors that can occur while configuring, indexing, or iterating a merge.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MergeError {
    /// The handler could not derive a configuration; no indexing took place.
    #[error("Merge configuration failed for operation '{operation}'")]
    Configuration {
        /// Identifier of the merge operation
        operation: String,
        /// The handler's error
        #[source]
        source: Box<crate::Error>,
    },

    /// A required transformation parameter is absent.
    #[error("Required parameter '{parameter}' is missing")]
    MissingParameter {
        /// Name of the missing parameter
        parameter: String,
    },

    /// A transformation parameter has an unusable value.
    #[error("Invalid value '{value}' for parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the parameter
        parameter: String,
        /// The rejected value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// Key extraction failed while scanning the source; no index was built.
    #[error("Merge key extraction failed for record {position} of collection '{collection}'")]
    KeyExtraction {
        /// Name of the source collection
        collection: String,
        /// Zero-based position of the record in the scan
        position: usize,
        /// The handler's error
        #[source]
        source: Box<crate::Error>,
    },

    /// An indexed reference no longer resolves: the source changed after
    /// indexing.
    #[error("Reference {reference} in group {key} of merge '{operation}' could not be resolved")]
    UnresolvedReference {
        /// Identifier of the merge operation
        operation: String,
        /// Debug rendering of the group key
        key: String,
        /// Debug rendering of the unresolved reference
        reference: String,
    },

    /// The group reducer failed for a group.
    #[error("Merging group {key} of merge '{operation}' failed")]
    Reduction {
        /// Identifier of the merge operation
        operation: String,
        /// Debug rendering of the group key
        key: String,
        /// The handler's error
        #[source]
        source: Box<crate::Error>,
    },

    /// A reducer was handed a group without members.
    #[error("Cannot merge an empty group")]
    EmptyGroup,
}

impl MergeError {
    /// Check if this error stems from unusable configuration.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            MergeError::Configuration { .. }
                | MergeError::MissingParameter { .. }
                | MergeError::InvalidParameter { .. }
        )
    }

    /// Check if this error reports a broken index/source invariant.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, MergeError::UnresolvedReference { .. })
    }

    /// Check if this error was raised by a key extractor or group reducer.
    pub fn is_strategy_error(&self) -> bool {
        matches!(
            self,
            MergeError::KeyExtraction { .. } | MergeError::Reduction { .. }
        )
    }

    /// Check if this error is a reducer contract violation.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, MergeError::EmptyGroup)
    }

    /// Get the merge operation identifier, if the error carries one.
    pub fn operation(&self) -> Option<&str> {
        match self {
            MergeError::Configuration { operation, .. }
            | MergeError::UnresolvedReference { operation, .. }
            | MergeError::Reduction { operation, .. } => Some(operation),
            _ => None,
        }
    }

    /// Get the parameter name if this is a parameter error.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            MergeError::MissingParameter { parameter }
            | MergeError::InvalidParameter { parameter, .. } => Some(parameter),
            _ => None,
        }
    }
}

// Conversion from MergeError to the main Error type
impl From<MergeError> for crate::Error {
    fn from(err: MergeError) -> Self {
        crate::Error::Merge(err)
    }
}
