use crate::items::{DELETE_BY_NAME, MUTEX, SELECT_ALL, SELECT_BY_NAME, insert, names, setup};
use sluice::{Database, Error, Value, params};

pub async fn statements(database: &Database) {
    let _lock = MUTEX.lock().await;
    let engine = setup(database).await;

    let result = database
        .run_statement(insert(engine), params!["alpha"])
        .await
        .expect("Failed to insert alpha");
    assert_eq!(result.rows_affected, 1);
    assert_eq!(result.new_row_id, None);

    let result = database
        .run_statement_return_result(insert(engine), params!["beta"], "id")
        .await
        .expect("Failed to insert beta");
    assert_eq!(result.rows_affected, 1);
    let id = result
        .new_row_id
        .as_ref()
        .and_then(Value::as_i64)
        .expect("The new row id must be returned for an insert");
    assert!(id > 0);

    let rows = database
        .run_query(SELECT_BY_NAME, params!["beta"])
        .await
        .expect("Failed to select beta");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_column("id").and_then(Value::as_i64), Some(id));
    assert_eq!(names(&rows), ["beta"]);

    let rows = database
        .run_string_query(SELECT_ALL)
        .await
        .expect("Failed to select all the items");
    assert_eq!(names(&rows), ["alpha", "beta"]);

    // Update is not an insert, no identifier is reported
    let result = database
        .run_statement_return_result(
            "UPDATE sluice_items SET name = ? WHERE name = ?",
            params!["gamma", "alpha"],
            "id",
        )
        .await
        .expect("Failed to update alpha");
    assert_eq!(result.new_row_id, None);

    let error = database
        .run_query(SELECT_BY_NAME, params![])
        .await
        .expect_err("A missing parameter must be rejected");
    assert!(
        matches!(
            error,
            Error::ParameterCount {
                expected: 1,
                actual: 0
            }
        ),
        "{error}"
    );

    let result = database
        .run_statement(DELETE_BY_NAME, params!["beta"])
        .await
        .expect("Failed to delete beta");
    assert_eq!(result.rows_affected, 1);
    let rows = database
        .run_query(SELECT_BY_NAME, params!["beta"])
        .await
        .expect("Failed to select beta");
    assert!(rows.is_empty());
}
