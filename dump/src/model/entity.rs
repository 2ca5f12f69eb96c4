//! Declared schema of the entity model: entity types and their accessors

use std::collections::BTreeSet;

use super::annotation::Annotation;
use super::type_name::TypeName;
use crate::constants::GETTER_PREFIX;

/// One declared accessor (getter-like method) of an entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorDescriptor {
    /// Method name, e.g. `getContacts`
    pub name:          String,
    /// Declared return type, e.g. `java.util.List`
    pub declared_type: TypeName,
    /// Generic element type for collection-valued accessors, e.g. `com.example.Contact`
    pub element_type:  Option<TypeName>,
    pub annotations:   BTreeSet<Annotation>,
}

impl AccessorDescriptor {
    pub fn new(name: impl Into<String>, declared_type: impl Into<TypeName>) -> Self {
        Self {
            name:          name.into(),
            declared_type: declared_type.into(),
            element_type:  None,
            annotations:   BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_element_type(mut self, element_type: impl Into<TypeName>) -> Self {
        self.element_type = Some(element_type.into());
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.insert(annotation);
        self
    }

    /// Whether the name follows the getter convention (`get` plus at least one character)
    pub fn is_getter(&self) -> bool {
        self.name.len() > GETTER_PREFIX.len() && self.name.starts_with(GETTER_PREFIX)
    }

    /// Property name derived from the getter name
    ///
    /// Strips the `get` prefix and lower-cases the first remaining character:
    /// `getContacts` becomes `contacts`. Returns `None` for non-getters.
    pub fn property_name(&self) -> Option<String> {
        if !self.is_getter() {
            return None;
        }
        let rest = &self.name[GETTER_PREFIX.len()..];
        let mut chars = rest.chars();
        chars
            .next()
            .map(|first| first.to_lowercase().chain(chars).collect())
    }
}

/// One persistent type of the model together with its accessors in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityTypeDescriptor {
    pub type_name: TypeName,
    pub accessors: Vec<AccessorDescriptor>,
}

impl EntityTypeDescriptor {
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name: type_name.into(),
            accessors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_accessor(mut self, accessor: AccessorDescriptor) -> Self {
        self.accessors.push(accessor);
        self
    }

    /// Find the getter that exposes `property`
    pub fn accessor_for_property(&self, property: &str) -> Option<&AccessorDescriptor> {
        self.accessors
            .iter()
            .find(|accessor| accessor.property_name().as_deref() == Some(property))
    }
}
