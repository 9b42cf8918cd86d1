use crate::{
    ExecutionResult, NativeResult, Value, contains_ignore_ascii_case,
};
use std::borrow::Cow;

/// How an engine reports the identifier of a freshly inserted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowIdStrategy {
    /// Driver reports the generated id next to the affected rows.
    AutoIncrement,
    /// The statement carries `RETURNING <id>`, the id is read from the first row.
    Returning,
    /// The statement emits a row (`OUTPUT inserted.<id>`) the id is read from.
    OutputRow,
}

/// Insert detection is a case-insensitive substring match.
pub fn is_insert(sql: &str) -> bool {
    contains_ignore_ascii_case(sql, "insert")
}

/// Appends `RETURNING <id_field>` to insert statements not already returning something.
pub fn ensure_returning<'a>(sql: &'a str, id_field: &str) -> Cow<'a, str> {
    if !is_insert(sql) || contains_ignore_ascii_case(sql, "returning") {
        return Cow::Borrowed(sql);
    }
    let trimmed = sql.trim_end().trim_end_matches(';').trim_end();
    Cow::Owned(format!("{trimmed} RETURNING {id_field}"))
}

/// Builds the canonical result of a statement.
///
/// `id_field` is the requested identifier column, the caller passes it only for insert-like
/// statements. Without it `new_row_id` is always `None`.
pub fn normalize(
    native: NativeResult,
    strategy: RowIdStrategy,
    id_field: Option<&str>,
) -> ExecutionResult {
    let new_row_id = id_field.and_then(|field| match strategy {
        RowIdStrategy::AutoIncrement => native.last_insert_id.map(Value::from_generated_id),
        RowIdStrategy::Returning | RowIdStrategy::OutputRow => native
            .result_sets
            .first()
            .and_then(|set| set.first())
            .and_then(|row| row.get_column(field))
            .cloned(),
    });
    ExecutionResult {
        result_sets: native.result_sets,
        rows_affected: native.rows_affected,
        new_row_id,
    }
}
