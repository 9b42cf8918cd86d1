use crate::items::{MUTEX, insert, names, setup};
use sluice::{Database, Engine, params};

/// Statements returning several result sets, not available with Postgres prepared statements.
pub async fn multiple(database: &Database) {
    let _lock = MUTEX.lock().await;
    let engine = setup(database).await;
    if engine == Engine::Postgres {
        return;
    }
    for name in ["one", "two"] {
        database
            .run_statement(insert(engine), params![name])
            .await
            .expect("Failed to insert");
    }
    let result = database
        .run_statement(
            "SELECT id, name FROM sluice_items ORDER BY id; SELECT id, name FROM sluice_items WHERE name = 'two'",
            (),
        )
        .await
        .expect("Failed to run multiple statements");
    assert_eq!(result.result_sets.len(), 2);
    assert_eq!(names(result.rows()), ["one", "two"]);
    let joined = result.join_result_sets();
    assert_eq!(names(&joined), ["one", "two", "two"]);
}
