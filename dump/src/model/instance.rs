//! Sampled rows and the values their properties hold
//!
//! An `Instance` is what a row source returns for one stored row. Reading a property
//! stands in for invoking the accessor on a live object, and `Value::runtime_type`
//! stands in for asking that object for its class.

use super::entity::AccessorDescriptor;
use super::type_name::TypeName;
use crate::error::{Error, Result};

/// Value held by one property of a sampled instance
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Scalar { type_name: TypeName, text: String },
    Entity(Box<Instance>),
    Collection { type_name: TypeName, items: Vec<Self> },
}

impl Value {
    /// Concrete type of the value, `None` for null
    pub fn runtime_type(&self) -> Option<&TypeName> {
        match self {
            Self::Null => None,
            Self::Scalar { type_name, .. } | Self::Collection { type_name, .. } => Some(type_name),
            Self::Entity(instance) => Some(&instance.type_name),
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// One stored row: its runtime type and its properties in stored order
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub type_name:  TypeName,
    pub properties: Vec<(String, Value)>,
}

impl Instance {
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name:  type_name.into(),
            properties: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.push((name.into(), value));
        self
    }

    /// Look up a property by name
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(property, _)| property == name)
            .map(|(_, value)| value)
    }

    /// Read the value behind a getter
    ///
    /// Fails with `Error::Invocation` when the accessor is not a getter or the
    /// instance does not expose the property.
    pub fn invoke(&self, accessor: &AccessorDescriptor) -> Result<&Value> {
        let property = accessor.property_name().ok_or_else(|| {
            Error::invocation_failed(&self.type_name, &accessor.name, "not a getter")
        })?;
        self.property(&property).ok_or_else(|| {
            Error::invocation_failed(
                &self.type_name,
                &accessor.name,
                format!("instance has no property '{property}'"),
            )
            .into()
        })
    }
}
