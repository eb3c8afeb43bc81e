//! Attribute definitions and the descriptors handed to the query tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Structural shape of an attribute.
///
/// Decided once by the domain model and carried explicitly so that join
/// classification is an exhaustive match rather than a runtime type test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// Single-valued reference (entity, embeddable or basic value)
    Singular,
    /// Unordered collection allowing duplicates
    Bag,
    /// Indexed collection
    List,
    /// Unordered collection without duplicates
    Set,
    /// Keyed collection; the key type is carried separately from the value type
    Map,
}

impl AttributeKind {
    pub fn is_plural(&self) -> bool {
        !matches!(self, AttributeKind::Singular)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::Singular => "singular",
            AttributeKind::Bag => "bag",
            AttributeKind::List => "list",
            AttributeKind::Set => "set",
            AttributeKind::Map => "map",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute as declared on a managed type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    pub kind: AttributeKind,
    /// Target type for singular attributes, element/value type for plurals
    #[serde(rename = "type")]
    pub target_type: String,
    /// Only meaningful (and required) for map attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
}

impl AttributeDef {
    pub fn new(
        name: impl Into<String>,
        kind: AttributeKind,
        target_type: impl Into<String>,
    ) -> Self {
        AttributeDef {
            name: name.into(),
            kind,
            target_type: target_type.into(),
            key_type: None,
        }
    }

    pub fn singular(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Singular, target_type)
    }

    pub fn bag(name: impl Into<String>, element_type: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Bag, element_type)
    }

    pub fn list(name: impl Into<String>, element_type: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::List, element_type)
    }

    pub fn set(name: impl Into<String>, element_type: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Set, element_type)
    }

    pub fn map(
        name: impl Into<String>,
        key_type: impl Into<String>,
        value_type: impl Into<String>,
    ) -> Self {
        AttributeDef {
            key_type: Some(key_type.into()),
            ..Self::new(name, AttributeKind::Map, value_type)
        }
    }
}

/// Resolved fact about one attribute of one type, as seen by the query tree.
///
/// Produced by [`DomainModel::find_attribute`](super::DomainModel::find_attribute);
/// `is_managed_type` is computed against the model at lookup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    pub name: String,
    /// Type that declares the attribute (may be a supertype of the queried type)
    pub declaring_type: String,
    pub kind: AttributeKind,
    pub target_type: String,
    pub key_type: Option<String>,
    pub is_managed_type: bool,
}

impl AttributeDescriptor {
    pub(crate) fn from_def(
        def: &AttributeDef,
        declaring_type: &str,
        is_managed_type: bool,
    ) -> Self {
        AttributeDescriptor {
            name: def.name.clone(),
            declaring_type: declaring_type.to_string(),
            kind: def.kind,
            target_type: def.target_type.clone(),
            key_type: def.key_type.clone(),
            is_managed_type,
        }
    }
}

impl fmt::Display for AttributeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} ({} of {})",
            self.declaring_type, self.name, self.kind, self.target_type
        )
    }
}
