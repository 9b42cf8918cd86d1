use crate::{ValueHolder, procedure_call, row_to_labeled};
use deadpool_postgres::Object;
use futures::TryStreamExt;
use sluice_core::{
    Connection, Error, NativeResult, Parameter, ProcedureResult, Result, RowNames,
    TranslatedQuery, Value, async_trait, truncate_long,
};
use std::pin::pin;

/// Pooled Postgres client, returned to the pool on drop.
pub struct PostgresConnection {
    pub(crate) client: Object,
}

fn wrap_error(error: tokio_postgres::Error, context: String) -> Error {
    let error = Error::native(error, context);
    log::error!("{:#}", error);
    error
}

impl PostgresConnection {
    async fn run(&mut self, sql: &str, values: Vec<Value>) -> Result<NativeResult> {
        let context = || format!("While running the query:\n{}", truncate_long!(sql));
        let statement = self
            .client
            .prepare_cached(sql)
            .await
            .map_err(|e| wrap_error(e, context()))?;
        let labels: RowNames = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let stream = self
            .client
            .query_raw(&statement, values.into_iter().map(ValueHolder))
            .await
            .map_err(|e| wrap_error(e, context()))?;
        let mut stream = pin!(stream);
        let mut rows = Vec::new();
        while let Some(row) = stream
            .try_next()
            .await
            .map_err(|e| wrap_error(e, context()))?
        {
            rows.push(row_to_labeled(&row, &labels)?);
        }
        let mut native = NativeResult {
            rows_affected: stream.rows_affected().unwrap_or_default(),
            ..Default::default()
        };
        if !labels.is_empty() {
            native.result_sets.push(rows);
        }
        Ok(native)
    }

    async fn batch(&mut self, sql: &str, context: &str) -> Result<()> {
        self.client
            .batch_execute(sql)
            .await
            .map_err(|e| wrap_error(e, context.to_string()))
    }
}

#[async_trait]
impl Connection for PostgresConnection {
    async fn execute(&mut self, query: TranslatedQuery) -> Result<NativeResult> {
        let sql = query.sql.trim_end().trim_end_matches(';');
        self.run(sql, query.bindings.into_values()).await
    }

    async fn begin(&mut self) -> Result<()> {
        self.batch("BEGIN", "While starting the transaction").await
    }

    async fn commit(&mut self) -> Result<()> {
        self.batch("COMMIT", "While committing the transaction")
            .await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.batch("ROLLBACK", "While rolling back the transaction")
            .await
    }

    async fn call_procedure(
        &mut self,
        name: &str,
        parameters: &[Parameter],
    ) -> Result<ProcedureResult> {
        let (sql, values) = procedure_call(name, parameters);
        let native = self.run(&sql, values).await?;
        let mut result = ProcedureResult::default();
        if let Some(row) = native.result_sets.into_iter().flatten().next() {
            result.output = row
                .labels
                .iter()
                .cloned()
                .zip(row.values.into_vec())
                .collect();
        }
        Ok(result)
    }
}
