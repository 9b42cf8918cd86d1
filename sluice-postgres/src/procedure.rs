use sluice_core::{Parameter, Value};
use std::fmt::Write;

/// `CALL name($1, .., NULL)`, returned values travel back as a single row.
///
/// Inputs and initialized output parameters are bound, uninitialized outputs are `NULL`.
pub(crate) fn procedure_call(name: &str, parameters: &[Parameter]) -> (String, Vec<Value>) {
    let mut sql = format!("CALL {name}(");
    let mut values = Vec::new();
    for (i, parameter) in parameters.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        if parameter.is_output() && parameter.value.is_null() {
            sql.push_str("NULL");
        } else {
            values.push(parameter.value.clone());
            let _ = write!(sql, "${}", values.len());
        }
    }
    sql.push(')');
    (sql, values)
}
