#[cfg(test)]
mod tests {
    use sluice::{Database, Engine};
    use sluice_tests::{MemoryAdapter, execute_tests, init_logs, silent_logs};
    use std::sync::Arc;

    async fn run(engine: Engine) {
        init_logs();
        let adapter = MemoryAdapter::new(engine);
        adapter.fail_statements_containing("sluice_missing");
        let database = Database::from_adapter(Arc::new(adapter.clone()));
        silent_logs! {
            execute_tests(&database).await;
        }
        assert_eq!(adapter.released(), adapter.acquired());
        assert!(adapter.acquired() > 0);
    }

    #[tokio::test]
    async fn mysql() {
        run(Engine::MySql).await;
    }

    #[tokio::test]
    async fn postgres() {
        run(Engine::Postgres).await;
    }

    #[tokio::test]
    async fn mssql() {
        run(Engine::Mssql).await;
    }
}
