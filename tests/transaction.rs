#[cfg(test)]
mod tests {
    use sluice::{Database, Engine, Error, Transaction, TransactionState, Value, params};
    use sluice_tests::{Fault, MemoryAdapter, init_logs};
    use std::sync::Arc;

    const INSERT: &str = "INSERT INTO sluice_items (name) VALUES (?)";

    fn memory(engine: Engine) -> (MemoryAdapter, Arc<Database>) {
        init_logs();
        let adapter = MemoryAdapter::new(engine);
        let database = Arc::new(Database::from_adapter(Arc::new(adapter.clone())));
        (adapter, database)
    }

    fn names(adapter: &MemoryAdapter) -> Vec<String> {
        adapter.items().into_iter().map(|v| v.name).collect()
    }

    #[tokio::test]
    async fn commit() {
        let (adapter, database) = memory(Engine::MySql);
        let id = database
            .run_transaction(|tx| {
                Box::pin(async move {
                    assert_eq!(tx.state(), TransactionState::Begun);
                    tx.run_statement(INSERT, params!["a"]).await?;
                    let result = tx
                        .run_statement_return_result(INSERT, params!["b"], "id")
                        .await?;
                    Ok::<_, Error>(result.new_row_id)
                })
            })
            .await
            .expect("The transaction must commit");
        assert_eq!(id, Some(Value::Int64(2)));
        assert_eq!(adapter.events(), ["BEGIN", "COMMIT"]);
        assert_eq!(names(&adapter), ["a", "b"]);
        assert_eq!(adapter.acquired(), 1);
        assert_eq!(adapter.released(), 1);
    }

    #[tokio::test]
    async fn rollback() {
        let (adapter, database) = memory(Engine::Postgres);
        let result = database
            .run_transaction(|tx| {
                Box::pin(async move {
                    tx.run_statement(INSERT, params!["a"]).await?;
                    Err::<(), _>(Error::InvalidParameter("stop".into()))
                })
            })
            .await;
        assert!(matches!(&result, Err(Error::InvalidParameter(v)) if v == "stop"));
        assert_eq!(adapter.events(), ["BEGIN", "ROLLBACK"]);
        assert!(adapter.items().is_empty());
        assert_eq!(adapter.released(), adapter.acquired());
    }

    #[tokio::test]
    async fn rollback_failure_keeps_the_original_error() {
        let (adapter, database) = memory(Engine::Mssql);
        adapter.inject(Fault::Rollback);
        let result = database
            .run_transaction(|tx| {
                Box::pin(async move {
                    tx.run_statement(INSERT, params!["a"]).await?;
                    Err::<(), _>(Error::Unsupported("unit of work".into()))
                })
            })
            .await;
        assert!(matches!(result, Err(Error::Unsupported(v)) if v == "unit of work"));
        assert_eq!(adapter.events(), ["BEGIN", "ROLLBACK"]);
        assert!(adapter.items().is_empty());
        assert_eq!(adapter.released(), adapter.acquired());
    }

    #[tokio::test]
    async fn commit_failure_is_a_conflict() {
        let (adapter, database) = memory(Engine::MySql);
        adapter.inject(Fault::Commit);
        let result = database
            .run_transaction(|tx| {
                Box::pin(async move {
                    tx.run_statement(INSERT, params!["a"]).await?;
                    Ok::<_, Error>(())
                })
            })
            .await;
        assert!(matches!(result, Err(Error::TransactionConflict(..))));
        assert_eq!(adapter.events(), ["BEGIN", "COMMIT"]);
        assert!(adapter.items().is_empty());
        assert_eq!(adapter.released(), adapter.acquired());
    }

    #[tokio::test]
    async fn begin_failure() {
        let (adapter, database) = memory(Engine::MySql);
        adapter.inject(Fault::Begin);
        let result = database
            .run_transaction(|_| Box::pin(async move { Ok::<_, Error>(()) }))
            .await;
        assert!(result.is_err());
        assert_eq!(adapter.events(), ["BEGIN"]);
        assert_eq!(adapter.acquired(), 1);
        assert_eq!(adapter.released(), 1);
        assert!(adapter.queries().is_empty());
    }

    #[tokio::test]
    async fn acquire_failure() {
        let (adapter, database) = memory(Engine::Postgres);
        adapter.inject(Fault::Acquire);
        let result = database
            .run_transaction(|_| Box::pin(async move { Ok::<_, Error>(()) }))
            .await;
        assert!(matches!(result, Err(Error::ConnectionUnavailable(..))));
        assert!(adapter.events().is_empty());
        assert_eq!(adapter.acquired(), 0);
    }

    #[tokio::test]
    async fn statement_failure_rolls_back() {
        let (adapter, database) = memory(Engine::Postgres);
        adapter.fail_statements_containing("broken");
        let result = database
            .run_transaction(|tx| {
                Box::pin(async move {
                    tx.run_statement(INSERT, params!["a"]).await?;
                    tx.run_statement("INSERT INTO broken (name) VALUES (?)", params!["b"])
                        .await?;
                    Ok::<_, Error>(())
                })
            })
            .await;
        assert!(matches!(result, Err(Error::Native(..))));
        assert_eq!(adapter.events(), ["BEGIN", "ROLLBACK"]);
        assert!(adapter.items().is_empty());
    }

    #[tokio::test]
    async fn uncommitted_work_is_isolated() {
        let (adapter, database) = memory(Engine::MySql);
        let outside = database.clone();
        database
            .run_transaction(move |tx| {
                Box::pin(async move {
                    tx.run_statement(INSERT, params!["a"]).await?;
                    let inside = tx.run_query("SELECT id, name FROM sluice_items", params![]).await?;
                    let outside = outside
                        .run_string_query("SELECT id, name FROM sluice_items")
                        .await?;
                    assert_eq!(inside.len(), 1);
                    assert!(outside.is_empty());
                    Ok::<_, Error>(())
                })
            })
            .await
            .expect("The transaction must commit");
        assert_eq!(names(&adapter), ["a"]);
        assert_eq!(adapter.acquired(), 2);
        assert_eq!(adapter.released(), 2);
    }

    #[tokio::test]
    async fn facade_statements_in_transaction() {
        let (adapter, database) = memory(Engine::Postgres);
        let facade = database.clone();
        let id = database
            .run_transaction(move |tx| {
                Box::pin(async move {
                    facade
                        .run_statement_in_transaction(tx, INSERT, params!["a"])
                        .await?;
                    let result = facade
                        .run_statement_in_transaction_return_result(tx, INSERT, params!["b"], "id")
                        .await?;
                    Ok::<_, Error>(result.new_row_id)
                })
            })
            .await
            .expect("The transaction must commit");
        assert_eq!(id, Some(Value::Int64(2)));
        adapter.assert_last_query("INSERT INTO sluice_items (name) VALUES ($1) RETURNING id");
        assert_eq!(names(&adapter), ["a", "b"]);
    }

    #[tokio::test]
    async fn transaction_of_another_engine() {
        let (_, database) = memory(Engine::MySql);
        let other = MemoryAdapter::new(Engine::Mssql);
        let connection = sluice::Adapter::acquire(&other)
            .await
            .expect("Could not acquire");
        let mut transaction = Transaction::begin(connection, Engine::Mssql)
            .await
            .expect("Could not begin");
        let result = database
            .run_statement_in_transaction(&mut transaction, INSERT, params!["a"])
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(..))));
        drop(transaction);
        assert_eq!(other.released(), 1);
    }
}
