//! Run configuration read from persistence-unit properties

use std::path::PathBuf;

use crate::catalog::PersistenceDescriptor;
use crate::constants::{PROPERTY_DATASET, PROPERTY_OUTPUT};
use crate::error::{Error, Result};

/// Where the rows come from and where the XML goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpConfig {
    pub dataset: PathBuf,
    /// `None` writes to stdout
    pub output:  Option<PathBuf>,
}

impl DumpConfig {
    /// Read `xml-dump.dataset` (required) and `xml-dump.output` relative to the descriptor
    pub fn from_descriptor(descriptor: &PersistenceDescriptor) -> Result<Self> {
        let dataset = descriptor
            .property(PROPERTY_DATASET)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                Error::missing(&format!("persistence-unit property '{PROPERTY_DATASET}'"))
            })?;
        let output = descriptor
            .property(PROPERTY_OUTPUT)
            .filter(|value| !value.trim().is_empty())
            .map(|value| descriptor.resolve(value));

        Ok(Self {
            dataset: descriptor.resolve(dataset),
            output,
        })
    }
}
