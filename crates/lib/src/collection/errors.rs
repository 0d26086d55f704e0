//! Error types for record collections.
//!
//! These cover the read contract shared by every collection: addressing
//! records, resolving references, and the read-only guarantee of cursors.

use thiserror::Error;

/// Errors raised by record collections and their cursors.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CollectionError {
    /// The record carries no reference into the collection it was passed to.
    #[error("Record is not addressable in collection '{collection}': {reason}")]
    NotAddressable {
        /// Name of the collection asked for the reference
        collection: String,
        /// Why no reference exists
        reason: String,
    },

    /// A reference issued by one store was used against another.
    #[error("Reference {reference} does not belong to collection '{collection}'")]
    ForeignReference {
        /// Debug rendering of the offending reference
        reference: String,
        /// Name of the collection the reference was used against
        collection: String,
    },

    /// A mutating operation was attempted on a read-only collection or cursor.
    #[error("Operation '{operation}' is not supported: collection is read-only")]
    UnsupportedOperation {
        /// The rejected operation
        operation: String,
    },

    /// A filter expression could not be parsed.
    #[error("Invalid filter expression '{expression}': {reason}")]
    InvalidFilter {
        /// The rejected expression
        expression: String,
        /// Why it was rejected
        reason: String,
    },

    /// A lock guarding collection storage was poisoned by a panicking writer.
    #[error("Storage lock poisoned in collection '{collection}'")]
    LockPoisoned {
        /// Name of the affected collection
        collection: String,
    },
}

impl CollectionError {
    /// Check if this error signals a violated caller contract.
    ///
    /// Contract violations are programming errors and are never retried.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            CollectionError::UnsupportedOperation { .. }
                | CollectionError::NotAddressable { .. }
                | CollectionError::ForeignReference { .. }
        )
    }

    /// Check if this error indicates a damaged storage layer.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, CollectionError::LockPoisoned { .. })
    }

    /// Check if this is a rejected mutation.
    pub fn is_unsupported_operation(&self) -> bool {
        matches!(self, CollectionError::UnsupportedOperation { .. })
    }

    /// Get the collection name if the error concerns a specific collection.
    pub fn collection_name(&self) -> Option<&str> {
        match self {
            CollectionError::NotAddressable { collection, .. }
            | CollectionError::ForeignReference { collection, .. }
            | CollectionError::LockPoisoned { collection } => Some(collection),
            CollectionError::UnsupportedOperation { .. } | CollectionError::InvalidFilter { .. } => {
                None
            }
        }
    }
}

// Conversion from CollectionError to the main Error type
impl From<CollectionError> for crate::Error {
    fn from(err: CollectionError) -> Self {
        crate::Error::Collection(err)
    }
}
