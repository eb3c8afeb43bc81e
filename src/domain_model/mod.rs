//! Domain model: managed types, their attributes, and the attribute
//! descriptors the query tree classifies joins from.

pub mod attribute;
pub mod config;
pub mod errors;
mod managed_type;

pub use attribute::{AttributeDef, AttributeDescriptor, AttributeKind};
pub use config::DomainModelConfig;
pub use errors::DomainModelError;
pub use managed_type::{DomainModel, ManagedType, ManagedTypeKind};
