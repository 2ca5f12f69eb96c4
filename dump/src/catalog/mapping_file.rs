//! Entity mapping files: the declared accessors of each entity type
//!
//! ```xml
//! <entity-mappings>
//!   <entity class="com.example.Person">
//!     <accessor name="getContacts" type="java.util.List" element-type="com.example.Contact">
//!       <annotation>OneToMany</annotation>
//!     </accessor>
//!   </entity>
//! </entity-mappings>
//! ```

use std::fs;
use std::path::Path;

use error_stack::ResultExt;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{AccessorDescriptor, Annotation, EntityTypeDescriptor, TypeName};

#[derive(Debug, Deserialize)]
pub struct EntityMappings {
    #[serde(rename = "entity", default)]
    pub entities: Vec<EntityMapping>,
}

#[derive(Debug, Deserialize)]
pub struct EntityMapping {
    #[serde(rename = "@class")]
    pub class:     TypeName,
    #[serde(rename = "accessor", default)]
    pub accessors: Vec<AccessorMapping>,
}

#[derive(Debug, Deserialize)]
pub struct AccessorMapping {
    #[serde(rename = "@name")]
    pub name:          String,
    #[serde(rename = "@type")]
    pub declared_type: TypeName,
    #[serde(rename = "@element-type", default)]
    pub element_type:  Option<TypeName>,
    #[serde(rename = "annotation", default)]
    pub annotations:   Vec<String>,
}

impl EntityMappings {
    pub fn from_path(path: &Path) -> Result<Self> {
        let xml = fs::read_to_string(path)
            .change_context(Error::failed_to("read mapping file", path.display()))?;
        Self::from_xml(&xml).attach(format!("Mapping file: {}", path.display()))
    }

    pub fn from_xml(xml: &str) -> Result<Self> {
        quick_xml::de::from_str(xml)
            .change_context(Error::invalid("mapping file", "malformed XML"))
    }
}

impl From<AccessorMapping> for AccessorDescriptor {
    fn from(mapping: AccessorMapping) -> Self {
        Self {
            name:          mapping.name,
            declared_type: mapping.declared_type,
            element_type:  mapping.element_type,
            annotations:   mapping
                .annotations
                .iter()
                .map(|raw| Annotation::parse(raw))
                .collect(),
        }
    }
}

impl From<EntityMapping> for EntityTypeDescriptor {
    fn from(mapping: EntityMapping) -> Self {
        Self {
            type_name: mapping.class,
            accessors: mapping.accessors.into_iter().map(Into::into).collect(),
        }
    }
}
