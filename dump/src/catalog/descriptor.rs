//! Persistence-unit descriptor (`persistence.xml`)

use std::fs;
use std::path::{Path, PathBuf};

use error_stack::ResultExt;
use serde::{Deserialize, Serialize};

use crate::constants::XML_INDENT;
use crate::error::{Error, Result};
use crate::model::TypeName;

/// Parsed `persistence.xml`
///
/// Only the first-level structure the dump needs is modelled. Namespaces, schema
/// locations and unknown elements are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "persistence")]
pub struct PersistenceDescriptor {
    #[serde(rename = "persistence-unit")]
    pub unit:     PersistenceUnit,
    /// Directory relative paths in the descriptor are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistenceUnit {
    #[serde(rename = "@name", default)]
    pub name:             String,
    #[serde(
        rename = "@transaction-type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub transaction_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider:         Option<String>,
    #[serde(rename = "mapping-file", default, skip_serializing_if = "Vec::is_empty")]
    pub mapping_files:    Vec<String>,
    #[serde(rename = "class", default, skip_serializing_if = "Vec::is_empty")]
    pub classes:          Vec<TypeName>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties:       Properties,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Properties {
    #[serde(rename = "property", default)]
    pub entries: Vec<Property>,
}

impl Properties {
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "@name")]
    pub name:  String,
    #[serde(rename = "@value", default)]
    pub value: String,
}

impl PersistenceDescriptor {
    /// Read and parse a descriptor file
    pub fn from_path(path: &Path) -> Result<Self> {
        let xml = fs::read_to_string(path).change_context(Error::failed_to(
            "read persistence descriptor",
            path.display(),
        ))?;
        let base_dir = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self::from_xml(&xml, base_dir)
            .attach(format!("Descriptor path: {}", path.display()))
    }

    /// Parse descriptor text, resolving relative paths against `base_dir`
    pub fn from_xml(xml: &str, base_dir: PathBuf) -> Result<Self> {
        let mut descriptor: Self = quick_xml::de::from_str(xml)
            .change_context(Error::invalid("persistence descriptor", "malformed XML"))?;
        descriptor.base_dir = base_dir;
        Ok(descriptor)
    }

    /// Value of a persistence-unit property
    pub fn property(&self, name: &str) -> Option<&str> {
        self.unit
            .properties
            .entries
            .iter()
            .find(|property| property.name == name)
            .map(|property| property.value.as_str())
    }

    /// Resolve a path written in the descriptor
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.base_dir.join(relative)
    }

    /// Render the descriptor back to XML for the diagnostic echo
    pub fn to_xml(&self) -> Result<String> {
        let mut buffer = String::new();
        let mut serializer = quick_xml::se::Serializer::new(&mut buffer);
        serializer.indent(' ', XML_INDENT);
        self.serialize(serializer)
            .change_context(Error::marshal_failed("echo persistence descriptor", "serializer error"))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic, clippy::unreachable)]

    use super::*;

    const DESCRIPTOR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<persistence xmlns="http://java.sun.com/xml/ns/persistence" version="2.0">
  <persistence-unit name="demo" transaction-type="RESOURCE_LOCAL">
    <provider>org.hibernate.ejb.HibernatePersistence</provider>
    <mapping-file>model.xml</mapping-file>
    <class>com.example.Person</class>
    <class>com.example.Widget</class>
    <properties>
      <property name="xml-dump.dataset" value="data.json"/>
      <property name="hibernate.dialect" value="org.hibernate.dialect.H2Dialect"/>
    </properties>
  </persistence-unit>
</persistence>
"#;

    #[test]
    fn test_parse_descriptor() {
        let descriptor = PersistenceDescriptor::from_xml(DESCRIPTOR, PathBuf::from("/srv/app"))
            .unwrap_or_else(|report| panic!("descriptor should parse: {report:?}"));

        assert_eq!(descriptor.unit.name, "demo");
        assert_eq!(
            descriptor.unit.transaction_type.as_deref(),
            Some("RESOURCE_LOCAL")
        );
        assert_eq!(descriptor.unit.mapping_files, vec!["model.xml".to_string()]);
        assert_eq!(
            descriptor.unit.classes,
            vec![
                TypeName::from("com.example.Person"),
                TypeName::from("com.example.Widget")
            ]
        );
        assert_eq!(descriptor.property("xml-dump.dataset"), Some("data.json"));
        assert_eq!(
            descriptor.resolve("data.json"),
            PathBuf::from("/srv/app/data.json")
        );
    }

    #[test]
    fn test_malformed_descriptor_is_configuration_error() {
        let Err(report) =
            PersistenceDescriptor::from_xml("<persistence><oops", PathBuf::from("."))
        else {
            unreachable!("malformed XML must fail");
        };
        assert!(report.current_context().is_fatal());
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let Err(report) = PersistenceDescriptor::from_path(Path::new("/nonexistent/persistence.xml"))
        else {
            unreachable!("missing file must fail");
        };
        assert!(matches!(report.current_context(), Error::Configuration(_)));
    }

    #[test]
    fn test_echo_keeps_classes_and_properties() {
        let descriptor = PersistenceDescriptor::from_xml(DESCRIPTOR, PathBuf::from("."))
            .unwrap_or_else(|report| panic!("descriptor should parse: {report:?}"));
        let echo = descriptor
            .to_xml()
            .unwrap_or_else(|report| panic!("echo should render: {report:?}"));

        assert!(echo.starts_with("<persistence>"));
        assert!(echo.contains(r#"<persistence-unit name="demo" transaction-type="RESOURCE_LOCAL">"#));
        assert!(echo.contains("<class>com.example.Widget</class>"));
        assert!(echo.contains(r#"<property name="xml-dump.dataset" value="data.json"/>"#));
    }
}
