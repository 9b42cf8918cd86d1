use crate::items::{MUTEX, SELECT_ALL, names, setup};
use sluice::{Database, Engine, Error};

pub async fn bulk(database: &Database) {
    let _lock = MUTEX.lock().await;
    let engine = setup(database).await;
    let rows = ["north", "south", "east", "west"]
        .into_iter()
        .map(|v| vec![v.into()])
        .collect::<Vec<_>>();
    let result = database
        .run_bulk_insert("INSERT INTO sluice_items (name) VALUES ?", rows)
        .await;
    match engine {
        Engine::MySql => {
            let result = result.expect("Failed to bulk insert");
            assert_eq!(result.rows_affected, 4);
            let rows = database
                .run_string_query(SELECT_ALL)
                .await
                .expect("Failed to select all the items");
            assert_eq!(names(&rows), ["north", "south", "east", "west"]);
        }
        _ => assert!(
            matches!(result, Err(Error::Unsupported(..))),
            "{engine} has no native bulk insert"
        ),
    }
}
