//! Join classification.
//!
//! Maps an [`AttributeDescriptor`] to the [`JoinShape`] of the node it
//! produces. Each [`AttributeKind`] has one shape factory. Only singular
//! attributes with a basic target are rejected as not joinable; a map
//! descriptor without a key type is malformed and reported as such.

use super::errors::QueryTreeError;
use super::node::JoinShape;
use crate::domain_model::{AttributeDescriptor, AttributeKind};

type ShapeFactory = fn(&AttributeDescriptor, &str) -> Result<JoinShape, QueryTreeError>;

fn singular_shape(
    attribute: &AttributeDescriptor,
    owner_path: &str,
) -> Result<JoinShape, QueryTreeError> {
    // basic values (String, Long, ...) have no table to join
    if attribute.is_managed_type {
        Ok(JoinShape::Singular)
    } else {
        Err(QueryTreeError::NotJoinable {
            attribute: attribute.name.clone(),
            path: owner_path.to_string(),
        })
    }
}

fn bag_shape(_: &AttributeDescriptor, _: &str) -> Result<JoinShape, QueryTreeError> {
    Ok(JoinShape::Bag)
}

fn list_shape(_: &AttributeDescriptor, _: &str) -> Result<JoinShape, QueryTreeError> {
    Ok(JoinShape::List)
}

fn set_shape(_: &AttributeDescriptor, _: &str) -> Result<JoinShape, QueryTreeError> {
    Ok(JoinShape::Set)
}

fn map_shape(
    attribute: &AttributeDescriptor,
    owner_path: &str,
) -> Result<JoinShape, QueryTreeError> {
    match &attribute.key_type {
        Some(key_type) => Ok(JoinShape::Map {
            key_type: key_type.clone(),
        }),
        None => Err(QueryTreeError::MissingMapKeyType {
            attribute: attribute.name.clone(),
            path: owner_path.to_string(),
        }),
    }
}

fn shape_factory(kind: AttributeKind) -> ShapeFactory {
    match kind {
        AttributeKind::Singular => singular_shape,
        AttributeKind::Bag => bag_shape,
        AttributeKind::List => list_shape,
        AttributeKind::Set => set_shape,
        AttributeKind::Map => map_shape,
    }
}

/// Classify `attribute` into a join shape; errors name the owning path.
pub fn classify(
    attribute: &AttributeDescriptor,
    owner_path: &str,
) -> Result<JoinShape, QueryTreeError> {
    shape_factory(attribute.kind)(attribute, owner_path)
}

/// Check that a name-based collection join targets the collection flavor it asked for.
pub fn expect_kind(
    attribute: &AttributeDescriptor,
    expected: AttributeKind,
    owner_path: &str,
) -> Result<(), QueryTreeError> {
    if attribute.kind == expected {
        Ok(())
    } else {
        Err(QueryTreeError::KindMismatch {
            attribute: attribute.name.clone(),
            path: owner_path.to_string(),
            expected,
            actual: attribute.kind,
        })
    }
}
