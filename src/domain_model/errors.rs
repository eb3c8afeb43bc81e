//! # Domain Model Error Types
//!
//! Errors raised while assembling or loading a [`DomainModel`](super::DomainModel).
//!
//! ## Error Categories
//!
//! - **Structure Errors**: duplicate types/attributes, broken inheritance
//! - **Attribute Errors**: map attributes without a key type and the reverse
//! - **Configuration Errors**: file I/O and YAML parsing issues

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainModelError {
    #[error("Managed type `{type_name}` is defined more than once")]
    DuplicateType { type_name: String },
    #[error("Attribute `{attribute}` is defined more than once on `{type_name}`")]
    DuplicateAttribute { type_name: String, attribute: String },
    #[error("Managed type `{type_name}` extends unknown type `{supertype}`")]
    UnknownSupertype { type_name: String, supertype: String },
    #[error("Inheritance cycle detected at `{type_name}`")]
    CyclicInheritance { type_name: String },
    #[error("Map attribute `{type_name}.{attribute}` has no key_type")]
    MissingMapKeyType { type_name: String, attribute: String },
    #[error("Attribute `{type_name}.{attribute}` declares a key_type but is not a map")]
    UnexpectedKeyType { type_name: String, attribute: String },
    #[error("`{name}` is not a valid identifier")]
    InvalidIdentifier { name: String },
    #[error("Failed to read domain model file: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse domain model: {error}")]
    ConfigParseError { error: String },
}
