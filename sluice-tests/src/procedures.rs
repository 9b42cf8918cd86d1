use crate::items::MUTEX;
use sluice::{Database, Engine, Parameter, SqlType, Value};

/// Stored procedure doubling its input, live engines only.
pub async fn procedures(database: &Database) {
    let _lock = MUTEX.lock().await;
    let engine = database.engine().expect("The database must be configured");
    let (drop, create) = match engine {
        Engine::MySql => (
            "DROP PROCEDURE IF EXISTS sluice_double",
            "CREATE PROCEDURE sluice_double(IN v INT, OUT doubled INT) \
             BEGIN SET doubled = v * 2; SELECT v AS input; END",
        ),
        Engine::Postgres => (
            "DROP PROCEDURE IF EXISTS sluice_double",
            "CREATE PROCEDURE sluice_double(v INT, INOUT doubled INT) LANGUAGE plpgsql \
             AS $$ BEGIN doubled := v * 2; END $$",
        ),
        Engine::Mssql => (
            "DROP PROCEDURE IF EXISTS sluice_double",
            "CREATE PROCEDURE sluice_double @v INT, @doubled INT OUTPUT AS \
             BEGIN SET NOCOUNT ON; SET @doubled = @v * 2; SELECT @v AS input; RETURN 7; END",
        ),
    };
    database
        .run_string_query(drop)
        .await
        .expect("Failed to drop sluice_double");
    database
        .run_string_query(create)
        .await
        .expect("Failed to create sluice_double");

    let result = database
        .execute_stored_procedure(
            "sluice_double",
            vec![
                Parameter::input("v", SqlType::Int, 21),
                Parameter::output("doubled", SqlType::Int),
            ],
        )
        .await
        .expect("Failed to execute sluice_double");
    assert_eq!(
        result.output.get("doubled").and_then(Value::as_i64),
        Some(42)
    );
    assert_eq!(
        result.return_value.as_ref().and_then(Value::as_i64),
        (engine == Engine::Mssql).then_some(7)
    );
    match engine {
        Engine::MySql | Engine::Mssql => {
            let rows = result.join_result_sets();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].get_column("input").and_then(Value::as_i64), Some(21));
        }
        Engine::Postgres => assert!(result.join_result_sets().is_empty()),
    }

    let error = database
        .execute_stored_procedure(
            "sluice_double; DROP TABLE sluice_items",
            vec![Parameter::input("v", SqlType::Int, 1)],
        )
        .await;
    assert!(error.is_err(), "Procedure names must be plain identifiers");
}
