use crate::{
    RETURN_VALUE, ROWS_AFFECTED, TiberiusManager, ValueWrap, decode, procedure_batch,
    statement_batch,
};
use deadpool::managed::Object;
use futures::TryStreamExt;
use sluice_core::{
    Bindings, Connection, Error, NativeResult, Parameter, ProcedureResult, Result, RowLabeled,
    RowNames, RowSet, TranslatedQuery, Value, async_trait, truncate_long,
};
use tiberius::{QueryItem, QueryStream, ToSql};

/// Pooled SQL Server session, returned to the pool on drop.
pub struct MssqlConnection {
    pub(crate) client: Object<TiberiusManager>,
}

fn wrap_error(error: tiberius::error::Error, context: String) -> Error {
    let error = Error::native(error, context);
    log::error!("{:#}", error);
    error
}

/// Reads every result set, labels come from the metadata preceding the rows.
async fn collect(mut stream: QueryStream<'_>) -> tiberius::Result<Vec<RowSet>> {
    let mut sets = Vec::new();
    let mut labels = RowNames::from([]);
    while let Some(item) = stream.try_next().await? {
        match item {
            QueryItem::Metadata(meta) => {
                labels = meta.columns().iter().map(|c| c.name().to_string()).collect();
                sets.push(RowSet::new());
            }
            QueryItem::Row(row) => {
                let values = row
                    .into_iter()
                    .map(|v| decode(&v))
                    .collect::<Result<Vec<Value>>>()
                    .map_err(|e| tiberius::error::Error::Conversion(e.to_string().into()))?;
                if let Some(set) = sets.last_mut() {
                    set.push(RowLabeled::new(labels.clone(), values.into()));
                }
            }
        }
    }
    Ok(sets)
}

/// Single row of the trailing select appended to a batch.
fn take_trailing(sets: &mut Vec<RowSet>, label: &str) -> Option<RowLabeled> {
    let is_trailing = sets
        .last()
        .and_then(|v| v.first())
        .is_some_and(|row| row.names().first().is_some_and(|v| v == label));
    if is_trailing {
        sets.pop().and_then(|v| v.into_iter().next())
    } else {
        None
    }
}

impl MssqlConnection {
    async fn run(&mut self, batch: &str, values: &[ValueWrap]) -> tiberius::Result<Vec<RowSet>> {
        if values.is_empty() {
            collect(self.client.simple_query(batch).await?).await
        } else {
            let params: Vec<&dyn ToSql> = values.iter().map(|v| v as &dyn ToSql).collect();
            collect(self.client.query(batch, &params).await?).await
        }
    }

    async fn control(&mut self, sql: &str, context: &str) -> Result<()> {
        self.client
            .simple_query(sql)
            .await
            .map_err(|e| wrap_error(e, context.to_string()))?
            .into_results()
            .await
            .map_err(|e| wrap_error(e, context.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Connection for MssqlConnection {
    async fn execute(&mut self, query: TranslatedQuery) -> Result<NativeResult> {
        let bindings = match query.bindings {
            Bindings::Named(v) => v,
            Bindings::Positional(v) if v.is_empty() => Vec::new(),
            Bindings::Positional(..) => {
                return Err(Error::InvalidParameter(
                    "SQL Server expects named bindings".into(),
                ));
            }
        };
        let (batch, row_count) = statement_batch(&query.sql, &bindings);
        let values: Vec<_> = bindings
            .into_iter()
            .map(|b| ValueWrap {
                value: b.value,
                sql_type: b.sql_type,
            })
            .collect();
        let mut result_sets = self.run(&batch, &values).await.map_err(|e| {
            wrap_error(
                e,
                format!("While running the query:\n{}", truncate_long!(query.sql)),
            )
        })?;
        let rows_affected = if row_count {
            take_trailing(&mut result_sets, ROWS_AFFECTED)
                .and_then(|row| row.values.first().and_then(Value::as_i64))
                .and_then(|v| u64::try_from(v).ok())
                .unwrap_or_default()
        } else {
            0
        };
        Ok(NativeResult {
            result_sets,
            rows_affected,
            last_insert_id: None,
        })
    }

    async fn begin(&mut self) -> Result<()> {
        self.control("BEGIN TRANSACTION", "While starting the transaction")
            .await
    }

    async fn commit(&mut self) -> Result<()> {
        self.control("COMMIT TRANSACTION", "While committing the transaction")
            .await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.control("ROLLBACK TRANSACTION", "While rolling back the transaction")
            .await
    }

    async fn call_procedure(
        &mut self,
        name: &str,
        parameters: &[Parameter],
    ) -> Result<ProcedureResult> {
        let batch = procedure_batch(name, parameters);
        let values: Vec<_> = parameters
            .iter()
            .map(|p| ValueWrap {
                value: p.value.clone(),
                sql_type: p.sql_type,
            })
            .collect();
        let mut result_sets = self
            .run(&batch, &values)
            .await
            .map_err(|e| wrap_error(e, format!("While calling the procedure `{name}`")))?;
        let mut result = ProcedureResult::default();
        if let Some(row) = take_trailing(&mut result_sets, RETURN_VALUE) {
            let mut values = row.values.into_vec().into_iter();
            result.return_value = values.next().filter(|v| !v.is_null());
            result.output = row.labels.iter().skip(1).cloned().zip(values).collect();
        }
        result.result_sets = result_sets;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, value: i64) -> RowLabeled {
        RowLabeled::new(RowNames::from([label.to_string()]), vec![Value::Int64(value)].into())
    }

    #[test]
    fn trailing_select() {
        let mut sets = vec![vec![row("id", 5)], vec![row(ROWS_AFFECTED, 1)]];
        let trailing = take_trailing(&mut sets, ROWS_AFFECTED).expect("trailing row");
        assert_eq!(trailing.values.first(), Some(&Value::Int64(1)));
        assert_eq!(sets.len(), 1);
        assert!(take_trailing(&mut sets, ROWS_AFFECTED).is_none());
        assert_eq!(sets.len(), 1);
    }
}
