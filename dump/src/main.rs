//! # Entity XML Dump
//!
//! Dumps every stored instance of a persistence unit's entity types to XML.
//!
//! Declared association types (interfaces, abstract bases) are resolved to the
//! concrete types actually stored by sampling rows before the dump, so polymorphic
//! properties are written under stable element names with `class` hints only where
//! they are needed.
//!
//! Usage: `entity_xml_dump [path/to/persistence.xml]`

use std::path::PathBuf;
use std::process::ExitCode;

use constants::{DEFAULT_DESCRIPTOR_PATH, EXIT_CONFIGURATION_ERROR, EXIT_MARSHAL_ERROR};
use support::TracingLevel;

mod catalog;
mod classifier;
mod collector;
mod config;
mod constants;
mod discovery;
mod driver;
mod error;
mod marshal;
mod model;
mod report;
mod row_source;
mod support;

fn main() -> ExitCode {
    TracingLevel::init_stderr_tracing();

    let descriptor_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_DESCRIPTOR_PATH), PathBuf::from);

    match driver::run_dump(&descriptor_path) {
        Ok(report) => {
            report.log_summary();
            report.exit_code()
        }
        Err(report) => {
            tracing::error!("{report:?}");
            if report.current_context().is_fatal() {
                ExitCode::from(EXIT_CONFIGURATION_ERROR)
            } else {
                ExitCode::from(EXIT_MARSHAL_ERROR)
            }
        }
    }
}
