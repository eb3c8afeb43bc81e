use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::query_tree::JoinType;
use crate::utils::identifier::is_identifier;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Query tree builder configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BuilderConfig {
    /// Prefix of the placeholder alias rendered for nodes without an explicit alias
    #[validate(
        length(min = 1, message = "Alias prefix cannot be empty"),
        custom(function = "validate_alias_prefix")
    )]
    pub alias_prefix: String,

    /// Whether a fetch over a plural attribute may be given an explicit alias
    pub allow_aliased_plural_fetch: bool,

    /// Join type used by the convenience operations that take none
    pub default_join_type: JoinType,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            alias_prefix: "alias_".to_string(),
            allow_aliased_plural_fetch: true,
            default_join_type: JoinType::Inner,
        }
    }
}

impl BuilderConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            alias_prefix: env::var("QUERYGRAPH_ALIAS_PREFIX")
                .unwrap_or_else(|_| "alias_".to_string()),
            allow_aliased_plural_fetch: parse_env_var(
                "QUERYGRAPH_ALLOW_ALIASED_PLURAL_FETCH",
                "true",
            )?,
            default_join_type: parse_env_var("QUERYGRAPH_DEFAULT_JOIN_TYPE", "inner")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }
}

#[allow(clippy::ptr_arg)]
fn validate_alias_prefix(prefix: &String) -> Result<(), ValidationError> {
    if is_identifier(prefix) {
        Ok(())
    } else {
        Err(ValidationError::new("alias_prefix")
            .with_message("Alias prefix must be an identifier".into()))
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
