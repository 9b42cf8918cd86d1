use sluice_core::{NamedBinding, Parameter, SqlType, separated_by};
use std::fmt::Write;

pub(crate) const ROWS_AFFECTED: &str = "__rows_affected";
pub(crate) const RETURN_VALUE: &str = "__return_value";

pub(crate) fn type_name(sql_type: SqlType) -> &'static str {
    match sql_type {
        SqlType::DateTime => "datetime2",
        SqlType::Text => "nvarchar(max)",
        SqlType::Int => "bigint",
        SqlType::Decimal => "decimal(38, 10)",
        SqlType::Boolean => "bit",
        SqlType::Float => "float",
        SqlType::Binary => "varbinary(max)",
        SqlType::Uuid => "uniqueidentifier",
    }
}

/// Text after leading whitespace and comments.
fn skip_comments(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start();
        if let Some(rest) = sql.strip_prefix("--") {
            sql = rest.find('\n').map_or("", |i| &rest[i + 1..]);
        } else if let Some(rest) = sql.strip_prefix("/*") {
            sql = rest.find("*/").map_or("", |i| &rest[i + 2..]);
        } else {
            return sql;
        }
    }
}

/// Schema statements must open their batch and report no row count.
pub(crate) fn is_definition(sql: &str) -> bool {
    let keyword = skip_comments(sql)
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default();
    ["CREATE", "ALTER", "DROP"]
        .iter()
        .any(|v| v.eq_ignore_ascii_case(keyword))
}

/// `DECLARE @a type = @P1, @b type = @P2;` binding driver positional parameters to names.
fn declare<'a>(out: &mut String, declarations: impl IntoIterator<Item = (&'a str, SqlType)>) {
    let declarations: Vec<_> = declarations.into_iter().collect();
    if declarations.is_empty() {
        return;
    }
    out.push_str("DECLARE ");
    let mut i = 0;
    separated_by(
        out,
        &declarations,
        |out, (name, sql_type)| {
            i += 1;
            let _ = write!(out, "@{name} {} = @P{i}", type_name(*sql_type));
        },
        ", ",
    );
    out.push_str(";\n");
}

/// Batch executing a statement with named bindings.
///
/// Unless the statement is a definition, a trailing select reports `@@ROWCOUNT`.
pub(crate) fn statement_batch(sql: &str, bindings: &[NamedBinding]) -> (String, bool) {
    let mut batch = String::new();
    declare(
        &mut batch,
        bindings.iter().map(|b| (b.name.as_str(), b.sql_type)),
    );
    let sql = sql.trim_end().trim_end_matches(';');
    batch.push_str(sql);
    let row_count = !is_definition(sql);
    if row_count {
        let _ = write!(batch, ";\nSELECT @@ROWCOUNT AS {ROWS_AFFECTED}");
    }
    (batch, row_count)
}

fn variable(name: &str) -> String {
    format!("__p_{name}")
}

/// Batch executing a stored procedure, every parameter travels through a typed variable.
///
/// The last result set holds the return value followed by the output parameters.
pub(crate) fn procedure_batch(name: &str, parameters: &[Parameter]) -> String {
    let variables: Vec<_> = parameters.iter().map(|p| variable(&p.name)).collect();
    let mut batch = String::new();
    declare(
        &mut batch,
        variables
            .iter()
            .zip(parameters)
            .map(|(v, p)| (v.as_str(), p.sql_type)),
    );
    let _ = write!(batch, "DECLARE @{RETURN_VALUE} int;\nEXEC @{RETURN_VALUE} = {name}");
    if !parameters.is_empty() {
        batch.push(' ');
    }
    separated_by(
        &mut batch,
        variables.iter().zip(parameters),
        |out, (v, p)| {
            let _ = write!(out, "@{} = @{v}", p.name);
            if p.is_output() {
                out.push_str(" OUTPUT");
            }
        },
        ", ",
    );
    let _ = write!(batch, ";\nSELECT @{RETURN_VALUE} AS {RETURN_VALUE}");
    for (v, p) in variables.iter().zip(parameters).filter(|(_, p)| p.is_output()) {
        let _ = write!(batch, ", @{v} AS [{}]", p.name);
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use sluice_core::Value;

    #[test]
    fn definitions() {
        assert!(is_definition("  create table t (id int)"));
        assert!(is_definition("DROP TABLE IF EXISTS t"));
        assert!(is_definition("ALTER PROCEDURE p AS SELECT 1"));
        assert!(!is_definition("CREATED_AT"));
        assert!(!is_definition("SELECT 1"));
        assert!(!is_definition(""));
    }

    #[test]
    fn commented_definitions() {
        assert!(is_definition("-- sluice_double\nCREATE PROCEDURE p AS SELECT 1"));
        assert!(is_definition("/* header */ -- note\n  drop table t"));
        assert!(is_definition("/* one */\n/* two */ALTER TABLE t ADD c int"));
        assert!(!is_definition("-- CREATE\nSELECT 1"));
        assert!(!is_definition("/* unterminated CREATE"));
        let (batch, row_count) =
            statement_batch("-- sluice_double\nCREATE PROCEDURE p AS SELECT 1", &[]);
        assert!(!row_count);
        assert_eq!(batch, "-- sluice_double\nCREATE PROCEDURE p AS SELECT 1");
    }

    #[test]
    fn statement() {
        let (batch, row_count) = statement_batch(
            "INSERT INTO t (a, b) VALUES (@param0, @param1);",
            &[
                NamedBinding {
                    name: "param0".into(),
                    sql_type: SqlType::Text,
                    value: "x".into(),
                },
                NamedBinding {
                    name: "param1".into(),
                    sql_type: SqlType::Int,
                    value: Value::Int64(1),
                },
            ],
        );
        assert!(row_count);
        assert_eq!(
            batch,
            indoc! {"
                DECLARE @param0 nvarchar(max) = @P1, @param1 bigint = @P2;
                INSERT INTO t (a, b) VALUES (@param0, @param1);
                SELECT @@ROWCOUNT AS __rows_affected"}
        );
    }

    #[test]
    fn definition_batch() {
        let (batch, row_count) = statement_batch("CREATE PROCEDURE p AS SELECT 1", &[]);
        assert!(!row_count);
        assert_eq!(batch, "CREATE PROCEDURE p AS SELECT 1");
    }

    #[test]
    fn procedure() {
        let batch = procedure_batch(
            "dbo.sluice_double",
            &[
                Parameter::input("v", SqlType::Int, 21),
                Parameter::output("doubled", SqlType::Int),
            ],
        );
        assert_eq!(
            batch,
            indoc! {"
                DECLARE @__p_v bigint = @P1, @__p_doubled bigint = @P2;
                DECLARE @__return_value int;
                EXEC @__return_value = dbo.sluice_double @v = @__p_v, @doubled = @__p_doubled OUTPUT;
                SELECT @__return_value AS __return_value, @__p_doubled AS [doubled]"}
        );
        assert_eq!(
            procedure_batch("cleanup", &[]),
            "DECLARE @__return_value int;\nEXEC @__return_value = cleanup;\nSELECT @__return_value AS __return_value"
        );
    }
}
