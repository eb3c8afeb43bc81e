use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::attribute::{AttributeDef, AttributeDescriptor, AttributeKind};
use super::errors::DomainModelError;
use crate::utils::identifier::is_identifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ManagedTypeKind {
    #[default]
    Entity,
    Embeddable,
}

/// An entity or embeddable type known to the domain model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedType {
    /// Canonical type name (used to seed root path identities)
    pub name: String,
    #[serde(default)]
    pub kind: ManagedTypeKind,
    /// Single-inheritance parent
    #[serde(default, rename = "extends", skip_serializing_if = "Option::is_none")]
    pub supertype: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
}

impl ManagedType {
    pub fn entity(name: impl Into<String>) -> Self {
        ManagedType {
            name: name.into(),
            kind: ManagedTypeKind::Entity,
            supertype: None,
            attributes: vec![],
        }
    }

    pub fn embeddable(name: impl Into<String>) -> Self {
        ManagedType {
            kind: ManagedTypeKind::Embeddable,
            ..Self::entity(name)
        }
    }

    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn is_entity(&self) -> bool {
        self.kind == ManagedTypeKind::Entity
    }

    /// Attribute declared directly on this type (inherited ones are not consulted).
    pub fn declared_attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// The typed domain model: managed types keyed by canonical name.
///
/// Types are added in any order; [`DomainModel::validate`] checks the
/// cross-type facts (supertypes exist, no inheritance cycles) once all of
/// them are present.
#[derive(Debug, Clone, Default)]
pub struct DomainModel {
    types: HashMap<String, ManagedType>,
}

impl DomainModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and validate a model from a list of types.
    pub fn from_types(types: Vec<ManagedType>) -> Result<Self, DomainModelError> {
        let mut model = DomainModel::new();
        for managed_type in types {
            model.add_type(managed_type)?;
        }
        model.validate()?;
        Ok(model)
    }

    /// Add one type, checking its local structure.
    pub fn add_type(&mut self, managed_type: ManagedType) -> Result<(), DomainModelError> {
        if !is_identifier(&managed_type.name) {
            return Err(DomainModelError::InvalidIdentifier {
                name: managed_type.name,
            });
        }
        if self.types.contains_key(&managed_type.name) {
            return Err(DomainModelError::DuplicateType {
                type_name: managed_type.name,
            });
        }

        let mut seen = HashSet::new();
        for attribute in &managed_type.attributes {
            if !is_identifier(&attribute.name) {
                return Err(DomainModelError::InvalidIdentifier {
                    name: attribute.name.clone(),
                });
            }
            if !seen.insert(attribute.name.as_str()) {
                return Err(DomainModelError::DuplicateAttribute {
                    type_name: managed_type.name.clone(),
                    attribute: attribute.name.clone(),
                });
            }
            match (attribute.kind, &attribute.key_type) {
                (AttributeKind::Map, None) => {
                    return Err(DomainModelError::MissingMapKeyType {
                        type_name: managed_type.name.clone(),
                        attribute: attribute.name.clone(),
                    });
                }
                (kind, Some(_)) if kind != AttributeKind::Map => {
                    return Err(DomainModelError::UnexpectedKeyType {
                        type_name: managed_type.name.clone(),
                        attribute: attribute.name.clone(),
                    });
                }
                _ => {}
            }
        }

        log::trace!(
            "Registered managed type `{}` with {} attributes",
            managed_type.name,
            managed_type.attributes.len()
        );
        self.types.insert(managed_type.name.clone(), managed_type);
        Ok(())
    }

    /// Check cross-type consistency: every supertype exists and no chain loops.
    pub fn validate(&self) -> Result<(), DomainModelError> {
        for managed_type in self.types.values() {
            let mut visited = HashSet::new();
            visited.insert(managed_type.name.as_str());
            let mut current = managed_type;
            while let Some(supertype) = &current.supertype {
                let parent =
                    self.types
                        .get(supertype)
                        .ok_or_else(|| DomainModelError::UnknownSupertype {
                            type_name: current.name.clone(),
                            supertype: supertype.clone(),
                        })?;
                if !visited.insert(parent.name.as_str()) {
                    return Err(DomainModelError::CyclicInheritance {
                        type_name: managed_type.name.clone(),
                    });
                }
                current = parent;
            }
        }
        Ok(())
    }

    pub fn managed_type(&self, name: &str) -> Option<&ManagedType> {
        self.types.get(name)
    }

    /// Look up an entity (embeddables are not returned).
    pub fn entity(&self, name: &str) -> Option<&ManagedType> {
        self.types.get(name).filter(|t| t.is_entity())
    }

    /// Whether `type_name` is an entity or embeddable (and so joinable as a singular target).
    pub fn is_managed(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(|k| k.as_str())
    }

    /// Type followed by its supertypes, nearest first.
    pub fn hierarchy<'a>(&'a self, type_name: &str) -> Vec<&'a ManagedType> {
        let mut chain = Vec::new();
        let mut next = self.types.get(type_name);
        while let Some(current) = next {
            // validate() rejects cycles, but a model that skipped it must not hang here
            if chain.iter().any(|t: &&ManagedType| t.name == current.name) {
                break;
            }
            chain.push(current);
            next = current.supertype.as_ref().and_then(|s| self.types.get(s));
        }
        chain
    }

    /// Reflexive subtype test following the supertype chain of `sub`.
    pub fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        self.hierarchy(sub).iter().any(|t| t.name == sup)
    }

    /// Resolve an attribute on `type_name`, including inherited attributes.
    pub fn find_attribute(&self, type_name: &str, attribute: &str) -> Option<AttributeDescriptor> {
        self.hierarchy(type_name).into_iter().find_map(|t| {
            t.declared_attribute(attribute).map(|def| {
                AttributeDescriptor::from_def(def, &t.name, self.is_managed(&def.target_type))
            })
        })
    }
}
