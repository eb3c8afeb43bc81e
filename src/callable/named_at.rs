//! Call support for drivers that bind named parameters as `@name=?`
//! instead of the standard `:name` notation.

use super::{
    CallableCall, CallableError, CallableStatementSupport, ParameterBinding, ParameterMode,
    ProcedureCall,
};

#[derive(Debug, Clone)]
pub struct NamedAtCallSupport {
    dialect: String,
}

impl NamedAtCallSupport {
    pub fn new(dialect: impl Into<String>) -> Self {
        NamedAtCallSupport {
            dialect: dialect.into(),
        }
    }
}

impl Default for NamedAtCallSupport {
    fn default() -> Self {
        Self::new("SQLServer-jTDS")
    }
}

impl CallableStatementSupport for NamedAtCallSupport {
    fn dialect_name(&self) -> &str {
        &self.dialect
    }

    fn interpret_call(&self, call: &ProcedureCall) -> Result<CallableCall, CallableError> {
        if call.procedure_name.is_empty() {
            return Err(CallableError::EmptyProcedureName);
        }

        // rough size: named params average under 8 chars, positional ones are "?,"
        let estimate = if call.function_return.is_none() && call.has_named_parameters() {
            call.parameters.len() * 12
        } else {
            call.parameters.len() * 2
        };

        // the function return value occupies position 1
        let (mut text, offset) = match call.function_return {
            Some(_) => {
                let mut text = String::with_capacity(11 + call.procedure_name.len() + estimate);
                text.push_str("{?=call ");
                (text, 2)
            }
            None => {
                let mut text = String::with_capacity(9 + call.procedure_name.len() + estimate);
                text.push_str("{call ");
                (text, 1)
            }
        };
        text.push_str(&call.procedure_name);
        text.push('(');

        let mut bindings = Vec::with_capacity(call.parameters.len());
        for (i, parameter) in call.parameters.iter().enumerate() {
            if parameter.mode == ParameterMode::RefCursor {
                return Err(CallableError::UnsupportedParameterMode {
                    dialect: self.dialect.clone(),
                    mode: parameter.mode,
                });
            }
            if i > 0 {
                text.push(',');
            }
            match &parameter.name {
                Some(name) => {
                    text.push('@');
                    text.push_str(name);
                    text.push_str("=?");
                }
                None => text.push('?'),
            }
            bindings.push(ParameterBinding {
                position: i + offset,
                name: parameter.name.clone(),
                mode: parameter.mode,
            });
        }
        text.push_str(")}");

        log::trace!("Interpreted call for `{}`: {}", call.procedure_name, text);
        Ok(CallableCall {
            call_text: text,
            function_return: call.function_return.clone(),
            bindings,
        })
    }
}
