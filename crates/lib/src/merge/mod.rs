//! Group-by-then-merge over record collections.
//!
//! A merge operation runs in three stages:
//!
//! 1. **Configure**: the [`MergeHandler`] derives its typed configuration from
//!    the [`MergeParameters`], once.
//! 2. **Index**: one pass over the source computes the merge key of every
//!    record and groups the record references by key into a [`MergeIndex`].
//! 3. **View**: a [`MergedCollection`] is returned immediately. Groups are
//!    resolved and merged only as a consumer advances a cursor over it.
//!
//! ```
//! use coalesce::{
//!     MemoryCollection, Record, RecordCollection,
//!     log::MemoryLog,
//!     merge::{MergeHandler, MergeParameters, PropertyMergeHandler},
//! };
//!
//! let source = MemoryCollection::from_records([
//!     Record::new("Road").with_property("ref", "A1").with_property("lane", 1),
//!     Record::new("Road").with_property("ref", "A1").with_property("lane", 2),
//!     Record::new("Road").with_property("ref", "B7").with_property("lane", 1),
//! ]);
//! let parameters = MergeParameters::new("roads")
//!     .with_parameter("property", "ref")
//!     .with_parameter("additional_property", "lane");
//!
//! let handler = PropertyMergeHandler::new();
//! let merged = handler
//!     .merge_instances(&source, &parameters, &MemoryLog::new())
//!     .unwrap();
//! assert_eq!(merged.size(), Some(2));
//!
//! let records: Vec<Record> = merged.cursor().unwrap().collect::<Result<_, _>>().unwrap();
//! assert_eq!(records[0].values("lane").len(), 2);
//! ```

mod errors;
mod handler;
mod index;
mod merged;
mod parameters;
pub mod property;

pub use errors::MergeError;
pub use handler::{FnMergeHandler, MergeHandler};
pub use index::MergeIndex;
pub use merged::{MergedCollection, MergedCursor};
pub use parameters::{ListMultimap, MergeParameters};
pub use property::{PropertyKey, PropertyMergeConfig, PropertyMergeHandler};
