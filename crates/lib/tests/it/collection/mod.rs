//! Collection integration tests
//!
//! This module tests the shared collection contract: filtered views, nesting of
//! views, and the in-memory arena under concurrent readers.

mod filtered;
