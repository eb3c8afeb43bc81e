//! Stored-procedure call text.
//!
//! A [`CallableStatementSupport`] turns a [`ProcedureCall`] (ordered
//! parameters plus an optional function return) into the call text sent to
//! the driver and the matching positional parameter bindings.

pub mod errors;
mod named_at;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use errors::CallableError;
pub use named_at::NamedAtCallSupport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterMode {
    In,
    Out,
    InOut,
    RefCursor,
}

impl fmt::Display for ParameterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParameterMode::In => "IN",
            ParameterMode::Out => "OUT",
            ParameterMode::InOut => "INOUT",
            ParameterMode::RefCursor => "REF_CURSOR",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureParameter {
    #[serde(default)]
    pub name: Option<String>,
    pub mode: ParameterMode,
    #[serde(default)]
    pub type_name: Option<String>,
}

impl ProcedureParameter {
    pub fn positional(mode: ParameterMode) -> Self {
        ProcedureParameter {
            name: None,
            mode,
            type_name: None,
        }
    }

    pub fn named(name: impl Into<String>, mode: ParameterMode) -> Self {
        ProcedureParameter {
            name: Some(name.into()),
            ..Self::positional(mode)
        }
    }
}

/// Return value of a function-style call (`{?=call f(...)}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionReturn {
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureCall {
    pub procedure_name: String,
    #[serde(default)]
    pub parameters: Vec<ProcedureParameter>,
    #[serde(default)]
    pub function_return: Option<FunctionReturn>,
}

impl ProcedureCall {
    pub fn has_named_parameters(&self) -> bool {
        self.parameters.iter().any(|p| p.name.is_some())
    }
}

/// Binding of one parameter to its 1-based JDBC-style position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterBinding {
    pub position: usize,
    pub name: Option<String>,
    pub mode: ParameterMode,
}

/// Interpreted call: the text to prepare and how to bind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallableCall {
    pub call_text: String,
    pub function_return: Option<FunctionReturn>,
    pub bindings: Vec<ParameterBinding>,
}

pub trait CallableStatementSupport {
    /// Name reported in errors.
    fn dialect_name(&self) -> &str;

    fn interpret_call(&self, call: &ProcedureCall) -> Result<CallableCall, CallableError>;
}
