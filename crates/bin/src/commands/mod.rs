//! Command implementations for the Coalesce binary.

pub mod merge;
