//! Serialization driver: catalog, discovery, collection, then the XML dump

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use error_stack::ResultExt;

use crate::catalog::{ModelCatalog, PersistenceDescriptor, XmlModelCatalog};
use crate::collector::{RootSet, collect_root_set};
use crate::config::DumpConfig;
use crate::discovery::{SubstitutionRegistry, TypeSubstitutionDiscoverer};
use crate::error::{Error, Result};
use crate::marshal::{Marshaller, XmlMarshaller};
use crate::model::EntityTypeDescriptor;
use crate::report::RunReport;
use crate::row_source::{JsonRowSource, RowSource};

/// Runs one dump over injected collaborators
pub struct SerializationDriver<'a> {
    catalog:    &'a dyn ModelCatalog,
    row_source: &'a dyn RowSource,
    marshaller: &'a dyn Marshaller,
}

impl<'a> SerializationDriver<'a> {
    pub fn new(
        catalog: &'a dyn ModelCatalog,
        row_source: &'a dyn RowSource,
        marshaller: &'a dyn Marshaller,
    ) -> Self {
        Self {
            catalog,
            row_source,
            marshaller,
        }
    }

    /// Run the pipeline, writing the descriptor echo and the dump to `out`
    ///
    /// Only a catalog that cannot be loaded fails the run. Query, invocation and
    /// marshalling failures are returned on the report.
    pub fn run(
        &self,
        descriptor: &PersistenceDescriptor,
        out: &mut dyn Write,
    ) -> Result<RunReport> {
        let catalog = self.catalog.load_entity_types(descriptor)?;

        let discovery = TypeSubstitutionDiscoverer::new(self.row_source).discover(&catalog);
        let (roots, collection_failures) = collect_root_set(&catalog, self.row_source);
        tracing::info!("Collected {} root instances", roots.len());

        let mut failures = discovery.failures;
        failures.extend(collection_failures);

        let marshal_failure = match self.write_output(
            descriptor,
            &catalog,
            &discovery.registry,
            &roots,
            out,
        ) {
            Ok(()) => None,
            Err(report) => {
                tracing::error!("{report:?}");
                Some(report.current_context().to_string())
            }
        };

        Ok(RunReport {
            entity_types: catalog.len(),
            substitutions: discovery.registry.iter().cloned().collect(),
            default_implementations: discovery.registry.defaults().cloned().collect(),
            conflicts: discovery.conflicts,
            failures,
            root_instances: roots.len(),
            marshal_failure,
        })
    }

    fn write_output(
        &self,
        descriptor: &PersistenceDescriptor,
        catalog: &[EntityTypeDescriptor],
        registry: &SubstitutionRegistry,
        roots: &RootSet,
        out: &mut dyn Write,
    ) -> Result<()> {
        let echo = descriptor.to_xml()?;
        writeln!(out, "{echo}")
            .change_context(Error::marshal_failed("write descriptor echo", "I/O error"))?;
        self.marshaller.marshal(catalog, registry, roots, out)
    }
}

/// Dump the persistence unit described at `descriptor_path`
///
/// Fails only with configuration errors: unreadable descriptor, mapping file or
/// dataset, a missing dataset property, or an output file that cannot be created.
pub fn run_dump(descriptor_path: &Path) -> Result<RunReport> {
    tracing::info!("Reading persistence unit from {}", descriptor_path.display());
    let descriptor = PersistenceDescriptor::from_path(descriptor_path)?;
    let config = DumpConfig::from_descriptor(&descriptor)?;
    let row_source = JsonRowSource::from_path(&config.dataset)?;
    let driver = SerializationDriver::new(&XmlModelCatalog, &row_source, &XmlMarshaller);

    match &config.output {
        Some(path) => {
            let file = File::create(path)
                .change_context(Error::failed_to("create output file", path.display()))?;
            driver.run(&descriptor, &mut BufWriter::new(file))
        }
        None => driver.run(&descriptor, &mut io::stdout().lock()),
    }
}
