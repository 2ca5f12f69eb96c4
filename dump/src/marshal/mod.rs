//! Marshalling the root set to XML

mod xml_marshaller;

use std::io::Write;

pub use xml_marshaller::XmlMarshaller;

use crate::collector::RootSet;
use crate::discovery::SubstitutionRegistry;
use crate::error::Result;
use crate::model::EntityTypeDescriptor;

/// Writes a root set, resolving polymorphic elements through the registry
///
/// Fails with `Error::Marshal`.
pub trait Marshaller {
    fn marshal(
        &self,
        catalog: &[EntityTypeDescriptor],
        registry: &SubstitutionRegistry,
        roots: &RootSet,
        out: &mut dyn Write,
    ) -> Result<()>;
}
