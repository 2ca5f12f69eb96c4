//! Model catalog loading
//!
//! The catalog is the declared side of the model: which entity types exist and which
//! accessors they expose. It is read once from the persistence-unit descriptor and the
//! mapping files it references, then never changes.

mod descriptor;
mod mapping_file;
mod xml_catalog;

pub use descriptor::PersistenceDescriptor;
pub use xml_catalog::XmlModelCatalog;

use crate::error::Result;
use crate::model::EntityTypeDescriptor;

/// Source of the entity model
///
/// Fails with `Error::Configuration` when the model cannot be read.
pub trait ModelCatalog {
    fn load_entity_types(
        &self,
        descriptor: &PersistenceDescriptor,
    ) -> Result<Vec<EntityTypeDescriptor>>;
}
