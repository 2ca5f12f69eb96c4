//! Row sources: where sampled instances come from
//!
//! The discoverer and the root-set collector only talk to the `RowSource` trait. The
//! shipped implementation reads a JSON dataset, see [`JsonRowSource`].

mod json_source;

use std::fmt;

pub use json_source::JsonRowSource;
use strum::Display;

use crate::error::{Error, Result};
use crate::model::{Instance, TypeName, Value};

/// Executes queries against stored rows
///
/// Both methods fail with `Error::Query`. Rows are returned in the order the source
/// stores them.
pub trait RowSource {
    /// Instances of `query.owner` matching the filter
    fn query(&self, query: &FilterQuery) -> Result<Vec<Instance>>;

    /// Every instance of `entity`
    fn query_all(&self, entity: &TypeName) -> Result<Vec<Instance>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Predicate {
    #[strum(serialize = "is not empty")]
    IsNotEmpty,
    #[strum(serialize = "is not null")]
    IsNotNull,
}

/// Filter selecting instances of `owner` whose `property` satisfies `predicate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterQuery {
    pub owner:     TypeName,
    pub property:  String,
    pub predicate: Predicate,
}

impl FilterQuery {
    pub fn new(owner: TypeName, property: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            owner,
            property: property.into(),
            predicate,
        }
    }

    /// Evaluate the filter against one instance
    ///
    /// Instances without the property never match. `is not empty` on a property that
    /// holds a non-collection value is a query error.
    pub fn matches(&self, instance: &Instance) -> Result<bool> {
        let Some(value) = instance.property(&self.property) else {
            return Ok(false);
        };
        match (self.predicate, value) {
            (_, Value::Null) => Ok(false),
            (Predicate::IsNotNull, _) => Ok(true),
            (Predicate::IsNotEmpty, Value::Collection { items, .. }) => Ok(!items.is_empty()),
            (Predicate::IsNotEmpty, _) => Err(Error::query_failed(
                self,
                format!("property '{}' is not a collection", self.property),
            )
            .into()),
        }
    }
}

impl fmt::Display for FilterQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "from {} x where x.{} {}",
            self.owner, self.property, self.predicate
        )
    }
}

/// Query text of an unfiltered select
pub fn select_all(entity: &TypeName) -> String {
    format!("from {entity}")
}
