//! Domain model configuration loading.
//!
//! Models are described in YAML:
//!
//! ```yaml
//! name: company            # optional
//! types:
//!   - name: Person
//!     attributes:
//!       - { name: name, kind: singular, type: String }
//!       - { name: manager, kind: singular, type: Person }
//!       - { name: orders, kind: bag, type: Order }
//!       - { name: scores, kind: map, key_type: String, type: Long }
//!   - name: Manager
//!     extends: Person
//!   - name: Address
//!     kind: embeddable
//! ```
//!
//! Any `type` that is not itself listed under `types` is treated as a basic
//! (scalar) type.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::DomainModelError;
use super::managed_type::{DomainModel, ManagedType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainModelConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub types: Vec<ManagedType>,
}

impl DomainModelConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, DomainModelError> {
        let contents = fs::read_to_string(path).map_err(|e| DomainModelError::ConfigReadError {
            error: e.to_string(),
        })?;

        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, DomainModelError> {
        serde_yaml::from_str(yaml).map_err(|e| DomainModelError::ConfigParseError {
            error: e.to_string(),
        })
    }

    /// Build the validated model.
    pub fn into_model(self) -> Result<DomainModel, DomainModelError> {
        log::debug!(
            "Building domain model `{}` from {} type definitions",
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.types.len()
        );
        DomainModel::from_types(self.types)
    }
}

impl DomainModel {
    /// Load and validate a model from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, DomainModelError> {
        DomainModelConfig::from_yaml_file(path)?.into_model()
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, DomainModelError> {
        DomainModelConfig::from_yaml_str(yaml)?.into_model()
    }
}
