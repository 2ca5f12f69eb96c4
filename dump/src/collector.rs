//! Root-set collection: every stored instance of every catalogued entity type

use crate::model::{EntityTypeDescriptor, Instance};
use crate::report::Failures;
use crate::row_source::{RowSource, select_all};

/// All instances gathered for one dump, in the order types and rows were visited
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootSet {
    instances: Vec<Instance>,
}

impl RootSet {
    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl FromIterator<Instance> for RootSet {
    fn from_iter<I: IntoIterator<Item = Instance>>(iter: I) -> Self {
        Self {
            instances: iter.into_iter().collect(),
        }
    }
}

/// Run `select all` for every entity type; a failing type contributes nothing
pub fn collect_root_set(
    catalog: &[EntityTypeDescriptor],
    row_source: &dyn RowSource,
) -> (RootSet, Failures) {
    let mut instances = Vec::new();
    let mut failures = Failures::default();

    for entity in catalog {
        let query = select_all(&entity.type_name);
        match row_source.query_all(&entity.type_name) {
            Ok(rows) => {
                tracing::debug!("{query} returned {} rows", rows.len());
                instances.extend(rows);
            }
            Err(report) => failures.record(&entity.type_name, None, &query, &report),
        }
    }

    (RootSet { instances }, failures)
}
