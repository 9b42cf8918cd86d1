use sluice_core::{Parameter, Value, separated_by};

/// Statements executing a stored procedure, outputs travel through session variables.
#[derive(Debug, PartialEq)]
pub(crate) struct ProcedureCall {
    /// `SET @var = ?` for every output, pooled sessions keep variables between calls.
    pub(crate) setup: Vec<(String, Value)>,
    /// `CALL name(?, @var)`, inputs bound in order.
    pub(crate) call: String,
    pub(crate) inputs: Vec<Value>,
    /// `SELECT @var AS name, ...`, absent without outputs.
    pub(crate) outputs: Option<String>,
}

fn variable(name: &str) -> String {
    format!("@sluice_{name}")
}

pub(crate) fn procedure_call(name: &str, parameters: &[Parameter]) -> ProcedureCall {
    let mut call = format!("CALL {name}(");
    separated_by(
        &mut call,
        parameters,
        |out, p| {
            if p.is_output() {
                out.push_str(&variable(&p.name));
            } else {
                out.push('?');
            }
        },
        ", ",
    );
    call.push(')');
    let outputs: Vec<_> = parameters.iter().filter(|p| p.is_output()).collect();
    let select = (!outputs.is_empty()).then(|| {
        let mut select = String::from("SELECT ");
        separated_by(
            &mut select,
            &outputs,
            |out, p| {
                out.push_str(&variable(&p.name));
                out.push_str(" AS `");
                out.push_str(&p.name);
                out.push('`');
            },
            ", ",
        );
        select
    });
    ProcedureCall {
        setup: outputs
            .iter()
            .map(|p| (format!("SET {} = ?", variable(&p.name)), p.value.clone()))
            .collect(),
        call,
        inputs: parameters
            .iter()
            .filter(|p| !p.is_output())
            .map(|p| p.value.clone())
            .collect(),
        outputs: select,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::SqlType;

    #[test]
    fn inputs_and_outputs() {
        let call = procedure_call(
            "shop.price",
            &[
                Parameter::input("item", SqlType::Int, 3),
                Parameter::output("total", SqlType::Decimal),
                Parameter::input("currency", SqlType::Text, "EUR"),
                Parameter::output("count", SqlType::Int).with_value(1),
            ],
        );
        assert_eq!(
            call.call,
            "CALL shop.price(?, @sluice_total, ?, @sluice_count)"
        );
        assert_eq!(call.inputs, vec![Value::Int64(3), "EUR".into()]);
        assert_eq!(
            call.outputs.as_deref(),
            Some("SELECT @sluice_total AS `total`, @sluice_count AS `count`")
        );
        assert_eq!(
            call.setup,
            vec![
                ("SET @sluice_total = ?".to_string(), Value::Null),
                ("SET @sluice_count = ?".to_string(), Value::Int64(1)),
            ]
        );
    }

    #[test]
    fn no_parameters() {
        let call = procedure_call("cleanup", &[]);
        assert_eq!(call.call, "CALL cleanup()");
        assert!(call.inputs.is_empty());
        assert_eq!(call.outputs, None);
    }
}
