//! Merge integration tests
//!
//! Tests are organized by concern: grouping guarantees of the index and view,
//! composition of views, and the built-in property merge handler.

mod nesting;
mod property;
