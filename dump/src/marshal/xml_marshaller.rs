//! XML marshaller writing the root set with substitution-aware element names
//!
//! Output follows the object-graph XML convention the dump has always used:
//!
//! - the root set is a `<list>` with one element per instance
//! - an instance element is named by its alias: the declared type registered for its
//!   runtime type, or the runtime type itself
//! - properties are child elements named after the property, null properties are omitted
//! - a property whose runtime type differs from its declared type, and is not the
//!   registered default for it, carries `class="<runtime type>"`

use std::collections::HashMap;
use std::io::Write;

use error_stack::ResultExt;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use super::Marshaller;
use crate::collector::RootSet;
use crate::constants::{ATTRIBUTE_CLASS, ELEMENT_LIST, ELEMENT_NULL, XML_INDENT};
use crate::discovery::SubstitutionRegistry;
use crate::error::{Error, Result};
use crate::model::{EntityTypeDescriptor, Instance, TypeName, Value};

#[derive(Debug, Default, Clone, Copy)]
pub struct XmlMarshaller;

impl Marshaller for XmlMarshaller {
    fn marshal(
        &self,
        catalog: &[EntityTypeDescriptor],
        registry: &SubstitutionRegistry,
        roots: &RootSet,
        out: &mut dyn Write,
    ) -> Result<()> {
        let context = MarshalContext::new(catalog, registry);
        let mut writer = Writer::new_with_indent(out, b' ', XML_INDENT);

        if roots.is_empty() {
            emit(&mut writer, Event::Empty(BytesStart::new(ELEMENT_LIST)))?;
        } else {
            emit(&mut writer, Event::Start(BytesStart::new(ELEMENT_LIST)))?;
            for instance in roots.iter() {
                let element = context.alias(&instance.type_name);
                context.write_entity(&mut writer, &element, None, instance, None)?;
            }
            emit(&mut writer, Event::End(BytesEnd::new(ELEMENT_LIST)))?;
        }

        let out = writer.get_mut();
        out.write_all(b"\n")
            .and_then(|()| out.flush())
            .change_context(Error::marshal_failed("flush XML output", "I/O error"))
    }
}

struct MarshalContext<'a> {
    schema:   HashMap<&'a TypeName, &'a EntityTypeDescriptor>,
    registry: &'a SubstitutionRegistry,
}

impl<'a> MarshalContext<'a> {
    fn new(catalog: &'a [EntityTypeDescriptor], registry: &'a SubstitutionRegistry) -> Self {
        Self {
            schema: catalog
                .iter()
                .map(|entity| (&entity.type_name, entity))
                .collect(),
            registry,
        }
    }

    /// Element name for a runtime type
    fn alias(&self, runtime: &TypeName) -> String {
        xml_name(self.registry.declared_for(runtime).unwrap_or(runtime).as_str())
    }

    /// `class` attribute value, if the runtime type has to be spelled out
    fn class_attribute<'t>(
        &self,
        declared: Option<&TypeName>,
        runtime: &'t TypeName,
    ) -> Option<&'t TypeName> {
        let declared = declared?;
        (declared != runtime && self.registry.concrete_for(declared) != Some(runtime))
            .then_some(runtime)
    }

    /// Declared schema for an instance, falling back to the type it was declared as
    fn schema_for(
        &self,
        runtime: &TypeName,
        declared: Option<&TypeName>,
    ) -> Option<&'a EntityTypeDescriptor> {
        self.schema
            .get(runtime)
            .or_else(|| declared.and_then(|declared| self.schema.get(declared)))
            .copied()
    }

    fn write_entity<W: Write>(
        &self,
        writer: &mut Writer<W>,
        element: &str,
        class: Option<&TypeName>,
        instance: &Instance,
        declared: Option<&TypeName>,
    ) -> Result<()> {
        let start = start_element(element, class);
        if instance.properties.iter().all(|(_, value)| value.is_null()) {
            return emit(writer, Event::Empty(start));
        }

        let schema = self.schema_for(&instance.type_name, declared);
        emit(writer, Event::Start(start))?;
        for (property, value) in &instance.properties {
            self.write_property(writer, schema, property, value)?;
        }
        emit(writer, Event::End(BytesEnd::new(element)))
    }

    fn write_property<W: Write>(
        &self,
        writer: &mut Writer<W>,
        schema: Option<&EntityTypeDescriptor>,
        property: &str,
        value: &Value,
    ) -> Result<()> {
        let accessor = schema.and_then(|schema| schema.accessor_for_property(property));
        let declared = accessor.map(|accessor| &accessor.declared_type);
        let element = xml_name(property);

        match value {
            Value::Null => Ok(()),
            Value::Scalar { type_name, text } => {
                let class = self.class_attribute(declared, type_name);
                write_text(writer, &element, class, text)
            }
            Value::Entity(instance) => {
                let class = self.class_attribute(declared, &instance.type_name);
                self.write_entity(writer, &element, class, instance, declared)
            }
            Value::Collection { items, .. } => {
                let element_type = accessor.and_then(|accessor| accessor.element_type.as_ref());
                self.write_collection(writer, &element, items, element_type)
            }
        }
    }

    fn write_collection<W: Write>(
        &self,
        writer: &mut Writer<W>,
        element: &str,
        items: &[Value],
        element_type: Option<&TypeName>,
    ) -> Result<()> {
        if items.is_empty() {
            return emit(writer, Event::Empty(BytesStart::new(element)));
        }
        emit(writer, Event::Start(BytesStart::new(element)))?;
        for item in items {
            self.write_item(writer, item, element_type)?;
        }
        emit(writer, Event::End(BytesEnd::new(element)))
    }

    /// Collection items are named by their alias, so they never need a `class` attribute
    fn write_item<W: Write>(
        &self,
        writer: &mut Writer<W>,
        item: &Value,
        element_type: Option<&TypeName>,
    ) -> Result<()> {
        match item {
            Value::Null => emit(writer, Event::Empty(BytesStart::new(ELEMENT_NULL))),
            Value::Scalar { type_name, text } => {
                write_text(writer, &self.alias(type_name), None, text)
            }
            Value::Entity(instance) => {
                let element = self.alias(&instance.type_name);
                self.write_entity(writer, &element, None, instance, element_type)
            }
            Value::Collection { type_name, items } => {
                self.write_collection(writer, &self.alias(type_name), items, None)
            }
        }
    }
}

fn start_element<'e>(element: &'e str, class: Option<&TypeName>) -> BytesStart<'e> {
    let mut start = BytesStart::new(element);
    if let Some(class) = class {
        start.push_attribute((ATTRIBUTE_CLASS, class.as_str()));
    }
    start
}

fn write_text<W: Write>(
    writer: &mut Writer<W>,
    element: &str,
    class: Option<&TypeName>,
    text: &str,
) -> Result<()> {
    let start = start_element(element, class);
    if text.is_empty() {
        return emit(writer, Event::Empty(start));
    }
    emit(writer, Event::Start(start))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(element)))
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .change_context(Error::marshal_failed("write XML event", "I/O error"))
}

/// Make a type or property name usable as an element name
fn xml_name(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();
    if !name.starts_with(|c: char| c.is_alphabetic() || c == '_') {
        name.insert(0, '_');
    }
    name
}
