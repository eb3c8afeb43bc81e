//! Integration tests for stored-procedure call text

#[cfg(test)]
mod callable_integration_tests {
    use querygraph::callable::{
        CallableError, CallableStatementSupport, NamedAtCallSupport, ParameterMode, ProcedureCall,
    };

    #[test]
    fn test_call_loaded_from_yaml() {
        let call: ProcedureCall = serde_yaml::from_str(
            r#"
procedure_name: monthly_totals
function_return: { type_name: Integer }
parameters:
  - { name: region, mode: in }
  - { name: total, mode: out, type_name: Decimal }
"#,
        )
        .unwrap();

        let support = NamedAtCallSupport::default();
        let result = support.interpret_call(&call).unwrap();

        assert_eq!(result.call_text, "{?=call monthly_totals(@region=?,@total=?)}");
        assert_eq!(result.bindings[0].position, 2);
        assert_eq!(result.bindings[1].mode, ParameterMode::Out);
    }

    #[test]
    fn test_support_as_trait_object() {
        let support: Box<dyn CallableStatementSupport> = Box::new(NamedAtCallSupport::new("jTDS"));
        let call = ProcedureCall {
            procedure_name: String::new(),
            parameters: vec![],
            function_return: None,
        };

        assert_eq!(support.dialect_name(), "jTDS");
        assert_eq!(support.interpret_call(&call).unwrap_err(), CallableError::EmptyProcedureName);
    }
}
