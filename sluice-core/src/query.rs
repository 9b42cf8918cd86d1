use crate::Value;
use std::{collections::BTreeMap, sync::Arc};

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Row) -> Self {
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values()[i])
    }
}

impl From<RowLabeled> for Row {
    fn from(value: RowLabeled) -> Self {
        value.values
    }
}

pub type RowSet = Vec<RowLabeled>;

/// Concatenates result sets in set order.
pub fn join_result_sets(result_sets: impl IntoIterator<Item = RowSet>) -> RowSet {
    result_sets.into_iter().flatten().collect()
}

/// Whatever an engine reports back for one statement, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeResult {
    pub result_sets: Vec<RowSet>,
    pub rows_affected: u64,
    /// Driver reported auto-generated id, auto-increment engines only.
    pub last_insert_id: Option<u64>,
}

impl NativeResult {
    pub fn with_rows(rows: RowSet) -> Self {
        Self {
            rows_affected: rows.len() as u64,
            result_sets: vec![rows],
            ..Default::default()
        }
    }
}

/// Canonical result of a statement, identical for every engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionResult {
    pub result_sets: Vec<RowSet>,
    pub rows_affected: u64,
    /// Identifier of the inserted row, only when requested for an insert.
    pub new_row_id: Option<Value>,
}

impl ExecutionResult {
    /// Rows of the first result set.
    pub fn rows(&self) -> &[RowLabeled] {
        self.result_sets.first().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn into_rows(self) -> RowSet {
        self.result_sets.into_iter().next().unwrap_or_default()
    }

    pub fn join_result_sets(self) -> RowSet {
        join_result_sets(self.result_sets)
    }
}

/// Outcome of a stored procedure call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcedureResult {
    pub result_sets: Vec<RowSet>,
    pub return_value: Option<Value>,
    /// Output parameters keyed by name.
    pub output: BTreeMap<String, Value>,
}

impl ProcedureResult {
    pub fn join_result_sets(self) -> RowSet {
        join_result_sets(self.result_sets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(v: i64) -> RowLabeled {
        RowLabeled::new(Arc::from(vec!["v".to_string()]), Box::new([v.into()]))
    }

    #[test]
    fn join_preserves_order() {
        let joined = join_result_sets(vec![vec![row(1), row(2)], vec![row(3)]]);
        let values: Vec<_> = joined.iter().map(|r| r.values[0].clone()).collect();
        assert_eq!(values, vec![1.into(), 2.into(), 3.into()]);
    }

    #[test]
    fn join_single_set_unchanged() {
        let set = vec![row(1), row(2)];
        assert_eq!(join_result_sets(vec![set.clone()]), set);
        assert!(join_result_sets(Vec::<RowSet>::new()).is_empty());
    }

    #[test]
    fn first_set() {
        let result = ExecutionResult {
            result_sets: vec![vec![row(7)], vec![row(8)]],
            ..Default::default()
        };
        assert_eq!(result.rows().len(), 1);
        assert_eq!(result.rows()[0].get_column("v"), Some(&Value::Int64(7)));
        assert!(ExecutionResult::default().rows().is_empty());
    }
}
