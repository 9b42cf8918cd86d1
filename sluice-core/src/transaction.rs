use crate::{
    Adapter, Connection, Engine, Error, ExecutionResult, Params, Result, RowSet, execute,
};
use futures::future::BoxFuture;
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Idle,
    Begun,
    Committed,
    RolledBack,
}

impl Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransactionState::Idle => "idle",
            TransactionState::Begun => "begun",
            TransactionState::Committed => "committed",
            TransactionState::RolledBack => "rolled back",
        })
    }
}

/// Open transaction, owning its connection until it concludes.
///
/// Statements run through it skip connection acquisition but are translated and
/// normalized exactly like the ones sent through an [`Adapter`].
pub struct Transaction {
    connection: Box<dyn Connection>,
    engine: Engine,
    state: TransactionState,
}

impl Transaction {
    /// Issues begin on `connection`, on failure the connection is dropped (released).
    pub async fn begin(mut connection: Box<dyn Connection>, engine: Engine) -> Result<Self> {
        connection.begin().await?;
        log::trace!("[{engine}] transaction begun");
        Ok(Self {
            connection,
            engine,
            state: TransactionState::Begun,
        })
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub async fn run_query(&mut self, sql: &str, params: Params) -> Result<RowSet> {
        Ok(self.run_statement(sql, params).await?.into_rows())
    }

    pub async fn run_statement(&mut self, sql: &str, params: Params) -> Result<ExecutionResult> {
        execute(self.connection.as_mut(), self.engine, sql, params, None).await
    }

    pub async fn run_statement_return_result(
        &mut self,
        sql: &str,
        params: Params,
        id_field: &str,
    ) -> Result<ExecutionResult> {
        execute(
            self.connection.as_mut(),
            self.engine,
            sql,
            params,
            Some(id_field),
        )
        .await
    }

    async fn commit(mut self) -> Result<()> {
        let result = self.connection.commit().await;
        self.state = TransactionState::Committed;
        log::trace!("[{}] transaction {}", self.engine, self.state);
        result.map_err(into_conflict)
    }

    async fn rollback(mut self) -> Result<()> {
        let result = self.connection.rollback().await;
        self.state = TransactionState::RolledBack;
        log::trace!("[{}] transaction {}", self.engine, self.state);
        result.map_err(into_conflict)
    }
}

fn into_conflict(error: Error) -> Error {
    match error {
        Error::Native(e) => Error::TransactionConflict(e),
        Error::TransactionConflict(e) => Error::TransactionConflict(e),
        other => Error::TransactionConflict(anyhow::Error::new(other)),
    }
}

/// Runs `work` inside a transaction opened on a connection of `adapter`.
///
/// Work that succeeds is committed, work that fails is rolled back and its error returned.
/// A rollback failure is only logged, a commit failure is returned as
/// [`Error::TransactionConflict`]. The connection goes back to the pool in every case.
/// ```ignore
/// let id = run_transaction(adapter, |tx| {
///     Box::pin(async move {
///         let result = tx
///             .run_statement_return_result("INSERT INTO items (name) VALUES (?)", params!["a"], "id")
///             .await?;
///         Ok(result.new_row_id)
///     })
/// })
/// .await?;
/// ```
pub async fn run_transaction<T, F>(adapter: &dyn Adapter, work: F) -> Result<T>
where
    T: Send,
    F: for<'t> FnOnce(&'t mut Transaction) -> BoxFuture<'t, Result<T>> + Send,
{
    let connection = adapter.acquire().await?;
    let mut transaction = Transaction::begin(connection, adapter.engine()).await?;
    match work(&mut transaction).await {
        Ok(value) => {
            transaction.commit().await?;
            Ok(value)
        }
        Err(error) => {
            if let Err(e) = transaction.rollback().await {
                log::error!("{:#}", e);
            }
            Err(error)
        }
    }
}
