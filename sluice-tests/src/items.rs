use sluice::{Database, Engine, RowLabeled, Value};
use std::sync::LazyLock;
use tokio::sync::Mutex;

/// Every suite works on the same table.
pub(crate) static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) const SELECT_ALL: &str = "SELECT id, name FROM sluice_items ORDER BY id";
pub(crate) const SELECT_BY_NAME: &str = "SELECT id, name FROM sluice_items WHERE name = ?";
pub(crate) const DELETE_BY_NAME: &str = "DELETE FROM sluice_items WHERE name = ?";

pub(crate) fn insert(engine: Engine) -> &'static str {
    match engine {
        Engine::Mssql => "INSERT INTO sluice_items (name) OUTPUT inserted.id VALUES (?)",
        _ => "INSERT INTO sluice_items (name) VALUES (?)",
    }
}

/// Recreates an empty `sluice_items` table.
pub(crate) async fn setup(database: &Database) -> Engine {
    let engine = database.engine().expect("The database must be configured");
    let create = match engine {
        Engine::MySql => {
            "CREATE TABLE sluice_items (id INT AUTO_INCREMENT PRIMARY KEY, name VARCHAR(255) NOT NULL)"
        }
        Engine::Postgres => {
            "CREATE TABLE sluice_items (id SERIAL PRIMARY KEY, name VARCHAR(255) NOT NULL)"
        }
        Engine::Mssql => {
            "CREATE TABLE sluice_items (id INT IDENTITY(1, 1) PRIMARY KEY, name NVARCHAR(255) NOT NULL)"
        }
    };
    database
        .run_string_query("DROP TABLE IF EXISTS sluice_items")
        .await
        .expect("Failed to drop sluice_items");
    database
        .run_string_query(create)
        .await
        .expect("Failed to create sluice_items");
    database
        .run_statement("DELETE FROM sluice_items", ())
        .await
        .expect("Failed to empty sluice_items");
    engine
}

pub(crate) fn names(rows: &[RowLabeled]) -> Vec<String> {
    rows.iter()
        .map(|row| {
            row.get_column("name")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_default()
        })
        .collect()
}
