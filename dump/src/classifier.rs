//! Association classification
//!
//! A static pass over the declared accessors. Each getter is tagged with the kind of
//! association its annotations declare, which decides how the discoverer samples it.

use strum_macros::Display;

use crate::model::{AccessorDescriptor, Annotation, EntityTypeDescriptor};

/// Collection-valued associations
const AGGREGATE_ANNOTATIONS: [Annotation; 2] = [Annotation::OneToMany, Annotation::ManyToMany];

/// Scalar references and plain fields
const SINGULAR_ANNOTATIONS: [Annotation; 3] = [
    Annotation::OneToOne,
    Annotation::ManyToOne,
    Annotation::Basic,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AssociationKind {
    /// One-to-many or many-to-many, sampled through its first element
    Aggregate,
    /// One-to-one, many-to-one or basic, sampled directly
    Singular,
    Unclassified,
}

/// An accessor paired with its association kind
#[derive(Debug, Clone, Copy)]
pub struct ClassifiedAccessor<'a> {
    pub accessor: &'a AccessorDescriptor,
    pub kind:     AssociationKind,
}

/// Classify one accessor of `owner`
pub fn classify(owner: &EntityTypeDescriptor, accessor: &AccessorDescriptor) -> AssociationKind {
    if !accessor.is_getter() {
        return AssociationKind::Unclassified;
    }

    let has_any = |group: &[Annotation]| group.iter().any(|a| accessor.annotations.contains(a));
    let aggregate = has_any(&AGGREGATE_ANNOTATIONS);
    let singular = has_any(&SINGULAR_ANNOTATIONS);

    match (aggregate, singular) {
        (true, true) => {
            tracing::warn!(
                "{}.{}() declares both collection and scalar associations, treating it as {}",
                owner.type_name,
                accessor.name,
                AssociationKind::Aggregate
            );
            AssociationKind::Aggregate
        }
        (true, false) => AssociationKind::Aggregate,
        (false, true) => AssociationKind::Singular,
        (false, false) => AssociationKind::Unclassified,
    }
}

/// Classified accessors of an entity type in declaration order, unclassified ones dropped
pub fn classified_accessors(entity: &EntityTypeDescriptor) -> Vec<ClassifiedAccessor<'_>> {
    entity
        .accessors
        .iter()
        .map(|accessor| ClassifiedAccessor {
            accessor,
            kind: classify(entity, accessor),
        })
        .filter(|classified| classified.kind != AssociationKind::Unclassified)
        .collect()
}
