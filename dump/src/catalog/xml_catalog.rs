use std::collections::HashMap;

use super::ModelCatalog;
use super::descriptor::PersistenceDescriptor;
use super::mapping_file::EntityMappings;
use crate::error::Result;
use crate::model::{EntityTypeDescriptor, TypeName};

/// Model catalog backed by the descriptor's `<class>` list and its mapping files
///
/// Listed classes come first in listed order. Entities that only appear in mapping
/// files are appended in mapping-file order.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlModelCatalog;

impl ModelCatalog for XmlModelCatalog {
    fn load_entity_types(
        &self,
        descriptor: &PersistenceDescriptor,
    ) -> Result<Vec<EntityTypeDescriptor>> {
        let mut entities: Vec<EntityTypeDescriptor> = Vec::new();
        let mut positions: HashMap<TypeName, usize> = HashMap::new();

        for class in &descriptor.unit.classes {
            if positions.contains_key(class) {
                tracing::warn!("Entity class {class} listed more than once, keeping the first");
                continue;
            }
            positions.insert(class.clone(), entities.len());
            entities.push(EntityTypeDescriptor::new(class.clone()));
        }

        for mapping_file in &descriptor.unit.mapping_files {
            let path = descriptor.resolve(mapping_file);
            tracing::debug!("Reading mapping file {}", path.display());
            let mappings = EntityMappings::from_path(&path)?;

            for mapping in mappings.entities {
                let entity = EntityTypeDescriptor::from(mapping);
                if let Some(&index) = positions.get(&entity.type_name) {
                    entities[index].accessors.extend(entity.accessors);
                } else {
                    positions.insert(entity.type_name.clone(), entities.len());
                    entities.push(entity);
                }
            }
        }

        if entities.is_empty() {
            tracing::warn!(
                "Persistence unit '{}' declares no entity types",
                descriptor.unit.name
            );
        }
        tracing::info!("Loaded {} entity types", entities.len());

        Ok(entities)
    }
}
