//! Merge handler grouping records by property values.
//!
//! Records whose key properties hold equal values are merged into one record.
//! The merged record keeps the key values once and combines the values of the
//! configured additional properties (or of every other property when
//! auto-detection is on) into an order-preserving, de-duplicated union.

use indexmap::IndexSet;

use super::{MergeError, MergeHandler, MergeParameters};
use crate::{
    Result,
    constants::{
        DEFAULT_AUTO_DETECT, PARAM_ADDITIONAL_PROPERTY, PARAM_AUTO_DETECT, PARAM_PROPERTY,
    },
    log::TransformationLog,
    record::{Record, Value},
};

/// Configuration of a property merge, derived from transformation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMergeConfig {
    key_properties: Vec<String>,
    additional_properties: Vec<String>,
    auto_detect: bool,
}

impl PropertyMergeConfig {
    /// Properties whose values form the merge key, in key order.
    pub fn key_properties(&self) -> &[String] {
        &self.key_properties
    }

    /// Non-key properties whose values are combined across a group.
    pub fn additional_properties(&self) -> &[String] {
        &self.additional_properties
    }

    /// Whether every non-key property is combined.
    pub fn auto_detect(&self) -> bool {
        self.auto_detect
    }

    fn is_key_property(&self, name: &str) -> bool {
        self.key_properties.iter().any(|p| p == name)
    }
}

/// Merge key of a property merge: the values of each key property, in the
/// order the key properties were configured.
///
/// A record lacking a key property contributes an empty value list for it, so
/// such records group together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyKey(Vec<Vec<Value>>);

impl PropertyKey {
    pub fn values(&self) -> &[Vec<Value>] {
        &self.0
    }
}

/// Merges records sharing the values of configured key properties.
///
/// Parameters:
/// * `property` (repeatable, required): key property names
/// * `additional_property` (repeatable): properties whose values are combined
/// * `auto_detect` (`true`/`false`, default `false`): combine every non-key
///   property
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyMergeHandler;

impl PropertyMergeHandler {
    pub fn new() -> Self {
        Self
    }

    /// Collects the non-blank, distinct values of a repeatable parameter.
    fn names(
        parameters: &MergeParameters,
        parameter: &str,
        log: &dyn TransformationLog,
    ) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for value in parameters.transformation().get(parameter) {
            let name = value.trim();
            if name.is_empty() {
                log.warn(&format!("Ignoring blank value of parameter '{parameter}'"));
            } else if names.iter().any(|n| n == name) {
                log.warn(&format!(
                    "Ignoring repeated value '{name}' of parameter '{parameter}'"
                ));
            } else {
                names.push(name.to_string());
            }
        }
        names
    }

    fn auto_detect(parameters: &MergeParameters, log: &dyn TransformationLog) -> Result<bool> {
        let mut values = parameters.transformation().get(PARAM_AUTO_DETECT);
        let Some(raw) = values.next() else {
            log.info(&format!(
                "Parameter '{PARAM_AUTO_DETECT}' not set, defaulting to {DEFAULT_AUTO_DETECT}"
            ));
            return Ok(DEFAULT_AUTO_DETECT);
        };
        if values.next().is_some() {
            log.warn(&format!(
                "Parameter '{PARAM_AUTO_DETECT}' given more than once, using '{raw}'"
            ));
        }
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(MergeError::InvalidParameter {
                parameter: PARAM_AUTO_DETECT.to_string(),
                value: raw.to_string(),
                reason: "expected 'true' or 'false'".to_string(),
            }
            .into()),
        }
    }
}

impl MergeHandler<Record> for PropertyMergeHandler {
    type Config = PropertyMergeConfig;
    type Key = PropertyKey;

    fn configure(
        &self,
        parameters: &MergeParameters,
        log: &dyn TransformationLog,
    ) -> Result<PropertyMergeConfig> {
        let key_properties = Self::names(parameters, PARAM_PROPERTY, log);
        if key_properties.is_empty() {
            return Err(MergeError::MissingParameter {
                parameter: PARAM_PROPERTY.to_string(),
            }
            .into());
        }

        let mut additional_properties = Self::names(parameters, PARAM_ADDITIONAL_PROPERTY, log);
        additional_properties.retain(|name| {
            let is_key = key_properties.contains(name);
            if is_key {
                log.warn(&format!(
                    "Additional property '{name}' is already a key property"
                ));
            }
            !is_key
        });

        let auto_detect = Self::auto_detect(parameters, log)?;

        Ok(PropertyMergeConfig {
            key_properties,
            additional_properties,
            auto_detect,
        })
    }

    fn merge_key(&self, record: &Record, config: &PropertyMergeConfig) -> Result<PropertyKey> {
        Ok(PropertyKey(
            config
                .key_properties
                .iter()
                .map(|property| record.values(property).to_vec())
                .collect(),
        ))
    }

    fn merge(
        &self,
        records: Vec<Record>,
        key: &PropertyKey,
        config: &PropertyMergeConfig,
    ) -> Result<Record> {
        let first = records.first().ok_or(MergeError::EmptyGroup)?;
        let mut merged = Record::new(first.type_name());

        for (property, values) in config.key_properties.iter().zip(key.values()) {
            if !values.is_empty() {
                merged.set_values(property.clone(), values.clone());
            }
        }

        let combined: IndexSet<&str> = if config.auto_detect {
            records
                .iter()
                .flat_map(|record| record.properties().map(|(name, _)| name))
                .filter(|name| !config.is_key_property(name))
                .collect()
        } else {
            config
                .additional_properties
                .iter()
                .map(String::as_str)
                .collect()
        };

        for property in combined {
            if !records.iter().any(|record| record.has_property(property)) {
                continue;
            }
            let values: IndexSet<&Value> = records
                .iter()
                .flat_map(|record| record.values(property))
                .collect();
            merged.set_values(property, values.into_iter().cloned().collect());
        }

        Ok(merged)
    }
}
