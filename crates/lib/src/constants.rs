//! Constants used throughout the Coalesce library.
//!
//! This module provides central definitions for the transformation parameter
//! names understood by the built-in merge handlers, and their defaults.

/// Identifier of the built-in property merge operation.
pub const PROPERTY_MERGE: &str = "property-merge";

/// Repeatable parameter naming a key property of a property merge.
pub const PARAM_PROPERTY: &str = "property";

/// Repeatable parameter naming a property whose values are combined.
pub const PARAM_ADDITIONAL_PROPERTY: &str = "additional_property";

/// Parameter enabling combination of every non-key property.
pub const PARAM_AUTO_DETECT: &str = "auto_detect";

/// Value of `auto_detect` when the parameter is absent.
pub const DEFAULT_AUTO_DETECT: bool = false;
