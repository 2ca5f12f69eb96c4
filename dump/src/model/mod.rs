//! Entity model: declared schema, sampled instances and type names

mod annotation;
mod entity;
mod instance;
mod type_name;

pub use annotation::Annotation;
pub use entity::{AccessorDescriptor, EntityTypeDescriptor};
pub use instance::{Instance, Value};
pub use type_name::TypeName;
