//! Tests for substitution discovery against in-memory datasets

#![allow(clippy::panic, clippy::unreachable)]

use std::cell::RefCell;
use std::collections::HashSet;

use serde_json::{Value as JsonValue, json};

use super::*;
use crate::model::Annotation;
use crate::row_source::JsonRowSource;

/// Row source that fails for selected owner types and records every query it sees
struct ScriptedRowSource {
    inner:   JsonRowSource,
    failing: HashSet<TypeName>,
    seen:    RefCell<Vec<String>>,
}

impl ScriptedRowSource {
    fn new(dataset: JsonValue) -> Self {
        Self {
            inner:   JsonRowSource::from_json(dataset)
                .unwrap_or_else(|report| panic!("dataset: {report:?}")),
            failing: HashSet::new(),
            seen:    RefCell::new(Vec::new()),
        }
    }

    fn failing_for(mut self, owner: &str) -> Self {
        self.failing.insert(owner.into());
        self
    }

    fn check(&self, owner: &TypeName, query: String) -> Result<()> {
        self.seen.borrow_mut().push(query.clone());
        if self.failing.contains(owner) {
            return Err(Error::query_failed(query, "connection reset").into());
        }
        Ok(())
    }
}

impl RowSource for ScriptedRowSource {
    fn query(&self, query: &FilterQuery) -> Result<Vec<Instance>> {
        self.check(&query.owner, query.to_string())?;
        self.inner.query(query)
    }

    fn query_all(&self, entity: &TypeName) -> Result<Vec<Instance>> {
        self.check(entity, select_all(entity))?;
        self.inner.query_all(entity)
    }
}

fn person_catalog() -> Vec<EntityTypeDescriptor> {
    vec![
        EntityTypeDescriptor::new("com.example.Person")
            .with_accessor(
                AccessorDescriptor::new("getContacts", "java.util.List")
                    .with_element_type("com.example.Contact")
                    .with_annotation(Annotation::OneToMany),
            )
            .with_accessor(
                AccessorDescriptor::new("getAddress", "com.example.Address")
                    .with_annotation(Annotation::ManyToOne),
            ),
    ]
}

fn widget_catalog() -> Vec<EntityTypeDescriptor> {
    vec![
        EntityTypeDescriptor::new("com.example.Widget").with_accessor(
            AccessorDescriptor::new("getName", "java.lang.String")
                .with_annotation(Annotation::Basic),
        ),
    ]
}

fn mappings(discovery: &Discovery) -> Vec<String> {
    discovery.registry.iter().map(ToString::to_string).collect()
}

fn defaults(discovery: &Discovery) -> Vec<String> {
    discovery.registry.defaults().map(ToString::to_string).collect()
}

#[test]
fn test_person_scenario_maps_contact_and_address() {
    let source = ScriptedRowSource::new(json!({
        "com.example.Person": [{
            "contacts": [{ "$type": "com.example.EmailContact", "email": "ann@example.com" }],
            "address": { "$type": "com.example.PostalAddress", "street": "Main St" }
        }]
    }));

    let discovery = TypeSubstitutionDiscoverer::new(&source).discover(&person_catalog());

    assert_eq!(
        mappings(&discovery),
        vec![
            "com.example.Contact -> com.example.EmailContact",
            "com.example.Address -> com.example.PostalAddress"
        ]
    );
    assert!(discovery.conflicts.is_empty());
    assert!(discovery.failures.failed_queries.is_empty());
    assert!(discovery.failures.skipped_accessors.is_empty());
}

#[test]
fn test_widget_with_plain_strings_registers_nothing() {
    let source = ScriptedRowSource::new(json!({
        "com.example.Widget": [{ "name": "a" }, { "name": "b" }, { "name": "c" }]
    }));

    let discovery = TypeSubstitutionDiscoverer::new(&source).discover(&widget_catalog());

    assert!(discovery.registry.is_empty());
    assert!(discovery.failures.failed_queries.is_empty());
    assert!(discovery.failures.skipped_accessors.is_empty());
}

#[test]
fn test_type_without_classified_accessors_is_never_sampled() {
    let catalog = vec![
        EntityTypeDescriptor::new("com.example.Tag")
            .with_accessor(AccessorDescriptor::new("getLabel", "java.lang.Object"))
            .with_accessor(
                AccessorDescriptor::new("setLabel", "void").with_annotation(Annotation::Basic),
            ),
    ];
    let source = ScriptedRowSource::new(json!({
        "com.example.Tag": [{ "label": "red" }]
    }));

    let discovery = TypeSubstitutionDiscoverer::new(&source).discover(&catalog);

    assert!(discovery.registry.is_empty());
    assert_eq!(*source.seen.borrow(), vec!["from com.example.Tag".to_string()]);
}

#[test]
fn test_first_differing_row_decides_the_mapping() {
    let catalog = vec![
        EntityTypeDescriptor::new("com.example.Order").with_accessor(
            AccessorDescriptor::new("getPayment", "com.example.Payment")
                .with_annotation(Annotation::OneToOne),
        ),
    ];
    let source = ScriptedRowSource::new(json!({
        "com.example.Order": [
            { "payment": null },
            { "payment": { "$type": "com.example.Payment", "amount": 1 } },
            { "payment": { "$type": "com.example.CardPayment", "amount": 2 } },
            { "payment": { "$type": "com.example.CashPayment", "amount": 3 } }
        ]
    }));

    let discovery = TypeSubstitutionDiscoverer::new(&source).discover(&catalog);

    assert_eq!(
        mappings(&discovery),
        vec!["com.example.Payment -> com.example.CardPayment"]
    );
}

#[test]
fn test_aggregate_skips_rows_without_observable_elements() {
    let catalog = vec![
        EntityTypeDescriptor::new("com.example.Team").with_accessor(
            AccessorDescriptor::new("getMembers", "java.util.Set")
                .with_element_type("com.example.Member")
                .with_annotation(Annotation::ManyToMany),
        ),
    ];
    let source = ScriptedRowSource::new(json!({
        "com.example.Team": [
            { "members": [] },
            { "members": [null, null] },
            { "members": [{ "$type": "com.example.Member" }] },
            { "members": [null, { "$type": "com.example.Captain" }] },
            { "members": [{ "$type": "com.example.Coach" }] }
        ]
    }));

    let discovery = TypeSubstitutionDiscoverer::new(&source).discover(&catalog);

    assert_eq!(
        mappings(&discovery),
        vec!["com.example.Member -> com.example.Captain"]
    );
}

#[test]
fn test_query_failure_for_one_type_does_not_affect_another() {
    let mut catalog = widget_catalog();
    catalog.extend(person_catalog());
    let source = ScriptedRowSource::new(json!({
        "com.example.Widget": [{ "name": "a" }],
        "com.example.Person": [{
            "contacts": [{ "$type": "com.example.EmailContact" }],
            "address": { "$type": "com.example.PostalAddress" }
        }]
    }))
    .failing_for("com.example.Widget");

    let discovery = TypeSubstitutionDiscoverer::new(&source).discover(&catalog);

    assert_eq!(discovery.registry.len(), 2);
    let failed: Vec<&str> = discovery
        .failures
        .failed_queries
        .iter()
        .map(|failed| failed.query.as_str())
        .collect();
    assert_eq!(
        failed,
        vec![
            "from com.example.Widget",
            "from com.example.Widget x where x.name is not null"
        ]
    );
}

/// Row source that ignores filters and returns the same rows for every query
struct UnfilteredRowSource {
    rows: Vec<Instance>,
}

impl RowSource for UnfilteredRowSource {
    fn query(&self, _query: &FilterQuery) -> Result<Vec<Instance>> {
        Ok(self.rows.clone())
    }

    fn query_all(&self, _entity: &TypeName) -> Result<Vec<Instance>> {
        Ok(self.rows.clone())
    }
}

#[test]
fn test_invocation_failure_skips_only_that_accessor() {
    let address = Instance::new("com.example.PostalAddress");
    let source = UnfilteredRowSource {
        rows: vec![
            Instance::new("com.example.Person")
                .with_property("address", Value::Entity(Box::new(address))),
        ],
    };

    let discovery = TypeSubstitutionDiscoverer::new(&source).discover(&person_catalog());

    assert_eq!(
        mappings(&discovery),
        vec!["com.example.Address -> com.example.PostalAddress"]
    );
    assert!(discovery.failures.failed_queries.is_empty());
    assert_eq!(discovery.failures.skipped_accessors.len(), 1);
    assert_eq!(
        discovery.failures.skipped_accessors[0].accessor,
        "getContacts"
    );
}

#[test]
fn test_scalar_where_collection_declared_is_invocation_error() {
    let catalog = person_catalog();
    let value = Value::Scalar {
        type_name: "java.lang.String".into(),
        text:      "oops".to_string(),
    };
    let row = Instance::new("com.example.Person").with_property("contacts", value.clone());

    let Err(report) = first_element_type(&row, &catalog[0].accessors[0], &value) else {
        unreachable!("scalar value must not be sampled as a collection");
    };
    assert!(matches!(report.current_context(), Error::Invocation(_)));
}

#[test]
fn test_untyped_collection_is_skipped() {
    let catalog = vec![
        EntityTypeDescriptor::new("com.example.Person").with_accessor(
            AccessorDescriptor::new("getNotes", "java.util.List")
                .with_annotation(Annotation::OneToMany),
        ),
    ];
    let source = ScriptedRowSource::new(json!({ "com.example.Person": [] }));

    let discovery = TypeSubstitutionDiscoverer::new(&source).discover(&catalog);

    assert!(discovery.registry.is_empty());
    assert_eq!(discovery.failures.skipped_accessors.len(), 1);
    assert_eq!(discovery.failures.skipped_accessors[0].accessor, "getNotes");
}

#[test]
fn test_entity_subtype_from_select_all() {
    let catalog = vec![EntityTypeDescriptor::new("com.example.Account")];
    let source = ScriptedRowSource::new(json!({
        "com.example.Account": [
            { "owner": "a" },
            { "$type": "com.example.SavingsAccount", "owner": "b" },
            { "$type": "com.example.CheckingAccount", "owner": "c" }
        ]
    }));

    let discovery = TypeSubstitutionDiscoverer::new(&source).discover(&catalog);

    assert!(discovery.registry.is_empty());
    assert_eq!(
        defaults(&discovery),
        vec!["com.example.Account -> com.example.SavingsAccount"]
    );
}

#[test]
fn test_subtype_rows_without_classified_accessors_register_no_substitution() {
    let catalog = vec![EntityTypeDescriptor::new("com.example.Tag")];
    let source = ScriptedRowSource::new(json!({
        "com.example.Tag": [{ "$type": "com.example.ColorTag" }]
    }));

    let discovery = TypeSubstitutionDiscoverer::new(&source).discover(&catalog);

    assert!(discovery.registry.is_empty());
    assert!(mappings(&discovery).is_empty());
    assert_eq!(defaults(&discovery), vec!["com.example.Tag -> com.example.ColorTag"]);
}

#[test]
fn test_later_conflicting_discovery_is_reported_not_registered() {
    let catalog = vec![
        EntityTypeDescriptor::new("com.example.Person").with_accessor(
            AccessorDescriptor::new("getHome", "com.example.Address")
                .with_annotation(Annotation::OneToOne),
        ),
        EntityTypeDescriptor::new("com.example.Company").with_accessor(
            AccessorDescriptor::new("getOffice", "com.example.Address")
                .with_annotation(Annotation::OneToOne),
        ),
    ];
    let source = ScriptedRowSource::new(json!({
        "com.example.Person": [{ "home": { "$type": "com.example.PostalAddress" } }],
        "com.example.Company": [{ "office": { "$type": "com.example.GeoAddress" } }]
    }));

    let discovery = TypeSubstitutionDiscoverer::new(&source).discover(&catalog);

    assert_eq!(
        mappings(&discovery),
        vec!["com.example.Address -> com.example.PostalAddress"]
    );
    assert_eq!(discovery.conflicts.len(), 1);
    assert_eq!(discovery.conflicts[0].rejected.concrete, "com.example.GeoAddress");
}

#[test]
fn test_discovery_is_idempotent() {
    let source = ScriptedRowSource::new(json!({
        "com.example.Person": [
            { "contacts": [], "address": null },
            {
                "contacts": [{ "$type": "com.example.PhoneContact" }],
                "address": { "$type": "com.example.PostalAddress" }
            }
        ]
    }));
    let discoverer = TypeSubstitutionDiscoverer::new(&source);

    let first = discoverer.discover(&person_catalog());
    let second = discoverer.discover(&person_catalog());

    assert_eq!(first.registry, second.registry);
    assert_eq!(first.registry.len(), 2);
}
