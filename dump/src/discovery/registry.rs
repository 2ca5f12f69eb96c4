//! Substitution registry
//!
//! Maps a declared type to the one concrete type discovered for it. Keys are written
//! once; the first discovered mapping wins and later ones are reported instead of
//! applied. The marshaller receives the registry as an explicit argument.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::model::TypeName;

/// A declared type and the concrete type observed in its place
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SubstitutionMapping {
    pub declared: TypeName,
    pub concrete: TypeName,
}

impl SubstitutionMapping {
    /// Create a mapping, `None` when both types are the same
    pub fn new(declared: TypeName, concrete: TypeName) -> Option<Self> {
        (declared != concrete).then_some(Self { declared, concrete })
    }
}

impl fmt::Display for SubstitutionMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.declared, self.concrete)
    }
}

/// Outcome of registering a mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// The same mapping was already registered
    Duplicate,
    /// A different concrete type is already registered for this declared type
    Conflict { existing: TypeName },
}

/// Write-once table of declared type -> concrete type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct MappingTable {
    mappings:    Vec<SubstitutionMapping>,
    by_declared: HashMap<TypeName, usize>,
}

impl MappingTable {
    fn register(&mut self, mapping: SubstitutionMapping) -> Registration {
        if let Some(existing) = self.concrete_for(&mapping.declared) {
            if *existing == mapping.concrete {
                return Registration::Duplicate;
            }
            return Registration::Conflict {
                existing: existing.clone(),
            };
        }
        self.by_declared
            .insert(mapping.declared.clone(), self.mappings.len());
        self.mappings.push(mapping);
        Registration::Added
    }

    fn concrete_for(&self, declared: &TypeName) -> Option<&TypeName> {
        self.by_declared
            .get(declared)
            .map(|&index| &self.mappings[index].concrete)
    }
}

/// Substitutions discovered for one dump
///
/// Accessor substitutions double as element aliases: the concrete type is written
/// under its declared type's name. Entity subtypes found by `select all` are only
/// default implementations; subtype rows keep their own element name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionRegistry {
    aliases:  MappingTable,
    defaults: MappingTable,
}

impl SubstitutionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a substitution sampled through an accessor
    pub fn register(&mut self, mapping: SubstitutionMapping) -> Registration {
        self.aliases.register(mapping)
    }

    /// Register the subtype an entity type's own rows were stored as
    pub fn register_default(&mut self, mapping: SubstitutionMapping) -> Registration {
        self.defaults.register(mapping)
    }

    /// Default implementation of a declared type, accessor substitutions first
    pub fn concrete_for(&self, declared: &TypeName) -> Option<&TypeName> {
        self.aliases
            .concrete_for(declared)
            .or_else(|| self.defaults.concrete_for(declared))
    }

    /// First declared type an accessor substitution maps to `concrete`, used as its alias
    pub fn declared_for(&self, concrete: &TypeName) -> Option<&TypeName> {
        self.aliases
            .mappings
            .iter()
            .find(|mapping| mapping.concrete == *concrete)
            .map(|mapping| &mapping.declared)
    }

    /// Accessor substitutions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &SubstitutionMapping> {
        self.aliases.mappings.iter()
    }

    /// Entity-subtype default implementations in registration order
    pub fn defaults(&self) -> impl Iterator<Item = &SubstitutionMapping> {
        self.defaults.mappings.iter()
    }

    pub fn len(&self) -> usize {
        self.aliases.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.mappings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic, clippy::unreachable)]

    use super::*;

    fn mapping(declared: &str, concrete: &str) -> SubstitutionMapping {
        SubstitutionMapping::new(declared.into(), concrete.into())
            .unwrap_or_else(|| panic!("{declared} and {concrete} must differ"))
    }

    #[test]
    fn test_identical_types_are_not_a_substitution() {
        assert!(SubstitutionMapping::new("a.Contact".into(), "a.Contact".into()).is_none());
    }

    #[test]
    fn test_first_registration_wins() {
        let mut registry = SubstitutionRegistry::new();
        assert_eq!(
            registry.register(mapping("a.Contact", "a.EmailContact")),
            Registration::Added
        );
        assert_eq!(
            registry.register(mapping("a.Contact", "a.EmailContact")),
            Registration::Duplicate
        );
        assert_eq!(
            registry.register(mapping("a.Contact", "a.PhoneContact")),
            Registration::Conflict {
                existing: "a.EmailContact".into()
            }
        );

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.concrete_for(&"a.Contact".into()),
            Some(&TypeName::from("a.EmailContact"))
        );
    }

    #[test]
    fn test_lookups_in_both_directions() {
        let mut registry = SubstitutionRegistry::new();
        registry.register(mapping("a.Contact", "a.EmailContact"));
        registry.register(mapping("a.Address", "a.PostalAddress"));

        assert_eq!(
            registry.declared_for(&"a.PostalAddress".into()),
            Some(&TypeName::from("a.Address"))
        );
        assert!(registry.declared_for(&"a.Person".into()).is_none());

        let rendered: Vec<String> = registry.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["a.Contact -> a.EmailContact", "a.Address -> a.PostalAddress"]
        );
    }

    #[test]
    fn test_defaults_are_not_aliases() {
        let mut registry = SubstitutionRegistry::new();
        assert_eq!(
            registry.register_default(mapping("a.Account", "a.SavingsAccount")),
            Registration::Added
        );

        assert!(registry.is_empty());
        assert!(registry.declared_for(&"a.SavingsAccount".into()).is_none());
        assert_eq!(
            registry.concrete_for(&"a.Account".into()),
            Some(&TypeName::from("a.SavingsAccount"))
        );
        assert_eq!(registry.defaults().count(), 1);
    }
}
