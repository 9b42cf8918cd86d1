use crate::items::{MUTEX, SELECT_ALL, SELECT_BY_NAME, insert, names, setup};
use sluice::{Database, Error, Value, params};

pub async fn transactions(database: &Database) {
    let _lock = MUTEX.lock().await;
    let engine = setup(database).await;
    let insert = insert(engine);

    // Committed work is visible afterwards
    let id = database
        .run_transaction(move |tx| {
            Box::pin(async move {
                tx.run_statement(insert, params!["first"]).await?;
                let result = tx
                    .run_statement_return_result(insert, params!["second"], "id")
                    .await?;
                let rows = tx.run_query(SELECT_BY_NAME, params!["first"]).await?;
                assert_eq!(rows.len(), 1, "Uncommitted rows are visible to the transaction");
                Ok::<_, Error>(result.new_row_id)
            })
        })
        .await
        .expect("The transaction must commit");
    let id = id.as_ref().and_then(Value::as_i64).expect("Missing row id");
    let rows = database
        .run_query(SELECT_BY_NAME, params!["second"])
        .await
        .expect("Failed to select second");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_column("id").and_then(Value::as_i64), Some(id));

    // Failed work is rolled back and its error returned
    let result = database
        .run_transaction(move |tx| {
            Box::pin(async move {
                tx.run_statement(insert, params!["third"]).await?;
                Err::<(), _>(Error::InvalidParameter("abort".into()))
            })
        })
        .await;
    assert!(
        matches!(&result, Err(Error::InvalidParameter(v)) if v == "abort"),
        "{result:?}"
    );
    let rows = database
        .run_query(SELECT_BY_NAME, params!["third"])
        .await
        .expect("Failed to select third");
    assert!(rows.is_empty(), "Rolled back rows must not be visible");

    // A failing statement aborts the whole unit of work
    let result = database
        .run_transaction(move |tx| {
            Box::pin(async move {
                tx.run_statement(insert, params!["fourth"]).await?;
                tx.run_statement("INSERT INTO sluice_missing (name) VALUES (?)", params!["x"])
                    .await?;
                Ok::<_, Error>(())
            })
        })
        .await;
    assert!(result.is_err());

    let rows = database
        .run_string_query(SELECT_ALL)
        .await
        .expect("Failed to select all the items");
    assert_eq!(names(&rows), ["first", "second"]);
}
