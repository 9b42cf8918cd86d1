use crate::{
    Connection, Engine, Error, ExecutionResult, Parameter, Params, ProcedureResult, Result,
    RowSet, Transaction, TranslatedQuery, Value, execute, is_identifier, is_object_name,
    truncate_long,
};
use async_trait::async_trait;

/// Engine specific implementation of the uniform operation set.
///
/// Only [`Adapter::engine`] and [`Adapter::acquire`] are required, every operation is
/// provided on top of them and can be overridden where the engine has a native path.
#[async_trait]
pub trait Adapter: Send + Sync {
    fn engine(&self) -> Engine;

    /// Borrows a connection from the pool.
    async fn acquire(&self) -> Result<Box<dyn Connection>>;

    /// Drains the pool.
    async fn close(&self) -> Result<()> {
        Ok(())
    }

    /// Parameterless text statement, rows of the first result set.
    async fn run_string_query(&self, sql: &str) -> Result<RowSet> {
        let mut connection = self.acquire().await?;
        log::debug!("[{}] {}", self.engine(), truncate_long!(sql));
        let native = connection.execute(TranslatedQuery::raw(sql)).await?;
        Ok(native.result_sets.into_iter().next().unwrap_or_default())
    }

    async fn run_query(&self, sql: &str, params: Params) -> Result<RowSet> {
        Ok(self.run_statement(sql, params).await?.into_rows())
    }

    async fn run_statement(&self, sql: &str, params: Params) -> Result<ExecutionResult> {
        let mut connection = self.acquire().await?;
        execute(connection.as_mut(), self.engine(), sql, params, None).await
    }

    async fn run_statement_return_result(
        &self,
        sql: &str,
        params: Params,
        id_field: &str,
    ) -> Result<ExecutionResult> {
        let mut connection = self.acquire().await?;
        execute(connection.as_mut(), self.engine(), sql, params, Some(id_field)).await
    }

    async fn run_statement_in_transaction(
        &self,
        transaction: &mut Transaction,
        sql: &str,
        params: Params,
    ) -> Result<ExecutionResult> {
        check_engine(self.engine(), transaction.engine())?;
        transaction.run_statement(sql, params).await
    }

    async fn run_statement_in_transaction_return_result(
        &self,
        transaction: &mut Transaction,
        sql: &str,
        params: Params,
        id_field: &str,
    ) -> Result<ExecutionResult> {
        check_engine(self.engine(), transaction.engine())?;
        transaction
            .run_statement_return_result(sql, params, id_field)
            .await
    }

    /// Inserts many rows with a single statement, `sql` holds one `?` standing for all rows.
    async fn run_bulk_insert(&self, sql: &str, rows: Vec<Vec<Value>>) -> Result<ExecutionResult> {
        let _ = (sql, rows);
        Err(Error::Unsupported(format!(
            "bulk insert is not supported by {}",
            self.engine()
        )))
    }

    /// Procedure and parameter names are interpolated, they must be plain identifiers.
    async fn execute_stored_procedure(
        &self,
        name: &str,
        parameters: Vec<Parameter>,
    ) -> Result<ProcedureResult> {
        if !is_object_name(name) {
            return Err(Error::InvalidParameter(format!(
                "`{name}` is not a valid procedure name"
            )));
        }
        if let Some(p) = parameters.iter().find(|p| !is_identifier(&p.name)) {
            return Err(Error::InvalidParameter(format!(
                "`{}` is not a valid parameter name",
                p.name
            )));
        }
        let mut connection = self.acquire().await?;
        log::debug!("[{}] procedure {name}", self.engine());
        connection.call_procedure(name, &parameters).await
    }
}

fn check_engine(adapter: Engine, transaction: Engine) -> Result<()> {
    if adapter != transaction {
        return Err(Error::InvalidParameter(format!(
            "transaction opened on {transaction} cannot run on {adapter}"
        )));
    }
    Ok(())
}
