//! Type-substitution discovery
//!
//! Declared association types are often interfaces or abstract bases while the stored
//! rows hold concrete subtypes. The marshaller needs to know those subtypes to tag
//! elements, so they are learned by sampling live rows:
//!
//! 1. For every entity type, the first `select all` row whose runtime type differs from
//!    the entity type becomes that type's default implementation. It is kept apart
//!    from accessor substitutions and never renames elements.
//! 2. For every aggregate accessor, rows with a non-empty collection are sampled; the
//!    first non-null element whose type differs from the declared element type wins.
//! 3. For every singular accessor, rows with a non-null value are sampled; the first
//!    value whose type differs from the declared return type wins.
//!
//! Passes walk the catalog in order. A failing query or unreadable property only
//! affects the accessor or type being sampled.

mod registry;
#[cfg(test)]
mod tests;

pub use registry::{Registration, SubstitutionMapping, SubstitutionRegistry};

use crate::classifier::{self, AssociationKind};
use crate::error::{Error, Result};
use crate::model::{AccessorDescriptor, EntityTypeDescriptor, Instance, TypeName, Value};
use crate::report::{Failures, SubstitutionConflict};
use crate::row_source::{FilterQuery, Predicate, RowSource, select_all};

/// Everything learned from one discovery run
#[derive(Debug, Default)]
pub struct Discovery {
    pub registry:  SubstitutionRegistry,
    pub conflicts: Vec<SubstitutionConflict>,
    pub failures:  Failures,
}

impl Discovery {
    fn record(&mut self, mapping: SubstitutionMapping) {
        let registration = self.registry.register(mapping.clone());
        self.resolve(mapping, registration);
    }

    fn record_default(&mut self, mapping: SubstitutionMapping) {
        let registration = self.registry.register_default(mapping.clone());
        self.resolve(mapping, registration);
    }

    fn resolve(&mut self, mapping: SubstitutionMapping, registration: Registration) {
        match registration {
            Registration::Added => tracing::info!("mapped {mapping}"),
            Registration::Duplicate => tracing::debug!("already mapped {mapping}"),
            Registration::Conflict { existing } => {
                tracing::warn!(
                    "Ignoring {mapping}: {} is already mapped to {existing}",
                    mapping.declared
                );
                self.conflicts.push(SubstitutionConflict {
                    rejected: mapping,
                    existing,
                });
            }
        }
    }
}

/// Samples rows to find concrete types behind declared association types
pub struct TypeSubstitutionDiscoverer<'a> {
    row_source: &'a dyn RowSource,
}

impl<'a> TypeSubstitutionDiscoverer<'a> {
    pub fn new(row_source: &'a dyn RowSource) -> Self {
        Self { row_source }
    }

    pub fn discover(&self, catalog: &[EntityTypeDescriptor]) -> Discovery {
        let mut discovery = Discovery::default();

        for entity in catalog {
            self.discover_entity_subtype(entity, &mut discovery);
        }

        for pass in [AssociationKind::Aggregate, AssociationKind::Singular] {
            for entity in catalog {
                for classified in classifier::classified_accessors(entity)
                    .into_iter()
                    .filter(|classified| classified.kind == pass)
                {
                    self.discover_accessor(entity, classified.accessor, pass, &mut discovery);
                }
            }
        }

        discovery
    }

    fn discover_entity_subtype(&self, entity: &EntityTypeDescriptor, discovery: &mut Discovery) {
        let query = select_all(&entity.type_name);
        tracing::debug!("running {query}");
        match self.row_source.query_all(&entity.type_name) {
            Ok(rows) => {
                if let Some(mapping) = rows.iter().find_map(|row| {
                    SubstitutionMapping::new(entity.type_name.clone(), row.type_name.clone())
                }) {
                    discovery.record_default(mapping);
                }
            }
            Err(report) => discovery
                .failures
                .record(&entity.type_name, None, &query, &report),
        }
    }

    fn discover_accessor(
        &self,
        entity: &EntityTypeDescriptor,
        accessor: &AccessorDescriptor,
        kind: AssociationKind,
        discovery: &mut Discovery,
    ) {
        let Some(property) = accessor.property_name() else {
            discovery
                .failures
                .skip(&entity.type_name, &accessor.name, "not a getter");
            return;
        };

        let (declared, predicate) = match kind {
            AssociationKind::Aggregate => {
                let Some(element_type) = &accessor.element_type else {
                    discovery.failures.skip(
                        &entity.type_name,
                        &accessor.name,
                        "collection has no declared element type",
                    );
                    return;
                };
                (element_type, Predicate::IsNotEmpty)
            }
            AssociationKind::Singular => (&accessor.declared_type, Predicate::IsNotNull),
            AssociationKind::Unclassified => return,
        };

        let query = FilterQuery::new(entity.type_name.clone(), property, predicate);
        match self.sample(&query, accessor, kind, declared) {
            Ok(Some(mapping)) => discovery.record(mapping),
            Ok(None) => tracing::debug!(
                "{}.{}() resolves to its declared type {declared}",
                entity.type_name,
                accessor.name
            ),
            Err(report) => discovery.failures.record(
                &entity.type_name,
                Some(&accessor.name),
                &query.to_string(),
                &report,
            ),
        }
    }

    /// Walk the query results until a row shows a concrete type different from `declared`
    fn sample(
        &self,
        query: &FilterQuery,
        accessor: &AccessorDescriptor,
        kind: AssociationKind,
        declared: &TypeName,
    ) -> Result<Option<SubstitutionMapping>> {
        tracing::debug!("running {query}");
        let rows = self.row_source.query(query)?;

        for row in &rows {
            let value = row.invoke(accessor)?;
            let candidate = match kind {
                AssociationKind::Aggregate => first_element_type(row, accessor, value)?,
                AssociationKind::Singular | AssociationKind::Unclassified => value.runtime_type(),
            };
            let Some(candidate) = candidate else {
                continue;
            };
            if let Some(mapping) = SubstitutionMapping::new(declared.clone(), candidate.clone()) {
                return Ok(Some(mapping));
            }
        }

        Ok(None)
    }
}

/// Runtime type of the first non-null element of a collection value
fn first_element_type<'v>(
    row: &Instance,
    accessor: &AccessorDescriptor,
    value: &'v Value,
) -> Result<Option<&'v TypeName>> {
    match value {
        Value::Null => Ok(None),
        Value::Collection { items, .. } => Ok(items.iter().find_map(Value::runtime_type)),
        other => Err(Error::invocation_failed(
            &row.type_name,
            &accessor.name,
            format!(
                "expected a collection, found {}",
                other
                    .runtime_type()
                    .map_or("an unknown value", TypeName::as_str)
            ),
        )
        .into()),
    }
}
