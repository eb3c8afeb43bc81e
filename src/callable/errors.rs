use thiserror::Error;

use super::ParameterMode;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CallableError {
    #[error("Dialect [{dialect}] not known to support {mode} parameters")]
    UnsupportedParameterMode { dialect: String, mode: ParameterMode },
    #[error("Procedure name cannot be empty")]
    EmptyProcedureName,
}
