//! CLI argument definitions for the Coalesce binary.

use std::path::PathBuf;

use clap::Parser;
use coalesce::{
    collection::PropertyFilter,
    constants::{PARAM_ADDITIONAL_PROPERTY, PARAM_AUTO_DETECT, PARAM_PROPERTY, PROPERTY_MERGE},
    merge::MergeParameters,
};

/// Merge JSON records sharing the values of key properties
#[derive(Parser, Debug)]
#[command(name = "coalesce")]
#[command(about = "Coalesce: merge records that share key property values")]
#[command(version)]
pub struct Cli {
    /// JSON file holding an array of records
    #[arg(short, long, env = "COALESCE_INPUT")]
    pub input: PathBuf,

    /// File to write the merged records to (stdout when omitted)
    #[arg(short, long, env = "COALESCE_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Key property; repeat for a composite key
    #[arg(short = 'p', long = "property", required = true)]
    pub properties: Vec<String>,

    /// Property whose values are combined across merged records
    #[arg(short = 'a', long = "additional-property")]
    pub additional_properties: Vec<String>,

    /// Combine every non-key property
    #[arg(long)]
    pub auto_detect: bool,

    /// Only merge records matching `property=value`; repeat to require several
    #[arg(short = 'w', long = "where")]
    pub filters: Vec<PropertyFilter>,

    /// Identifier of the merge operation, used in logs and errors
    #[arg(long, default_value = PROPERTY_MERGE)]
    pub operation: String,
}

impl Cli {
    /// Transformation parameters for the property merge handler.
    ///
    /// `auto_detect` is only passed when the flag is set, leaving the default
    /// to the handler.
    pub fn merge_parameters(&self) -> MergeParameters {
        let mut parameters = MergeParameters::new(&self.operation);
        for property in &self.properties {
            parameters = parameters.with_parameter(PARAM_PROPERTY, property);
        }
        for property in &self.additional_properties {
            parameters = parameters.with_parameter(PARAM_ADDITIONAL_PROPERTY, property);
        }
        if self.auto_detect {
            parameters = parameters.with_parameter(PARAM_AUTO_DETECT, "true");
        }
        parameters
    }
}
