use crate::{
    Connection, Engine, ExecutionResult, Params, Result, RowIdStrategy, Value, ensure_returning,
    expand_bulk_values, is_insert, normalize, translate, truncate_long,
};
use std::borrow::Cow;

/// Runs one statement on `connection`: translation, execution and normalization.
///
/// Passing `id_field` requests the new row identifier, honoured for insert statements only.
pub async fn execute(
    connection: &mut dyn Connection,
    engine: Engine,
    sql: &str,
    params: Params,
    id_field: Option<&str>,
) -> Result<ExecutionResult> {
    let id_field = id_field.filter(|_| is_insert(sql));
    let strategy = engine.row_id_strategy();
    let sql = match (strategy, id_field) {
        (RowIdStrategy::Returning, Some(field)) => ensure_returning(sql, field),
        _ => Cow::Borrowed(sql),
    };
    let query = translate(&sql, params, engine.placeholder_style())?;
    log::debug!("[{engine}] {}", truncate_long!(query.sql));
    let native = connection.execute(query).await?;
    Ok(normalize(native, strategy, id_field))
}

/// Runs a bulk insert, the single `?` of `sql` expands to one tuple per row.
pub async fn execute_bulk(
    connection: &mut dyn Connection,
    engine: Engine,
    sql: &str,
    rows: Vec<Vec<Value>>,
) -> Result<ExecutionResult> {
    let count = rows.len();
    let (sql, values) = expand_bulk_values(sql, rows)?;
    let query = translate(&sql, values.into(), engine.placeholder_style())?;
    log::debug!("[{engine}] {count} rows: {}", truncate_long!(query.sql));
    let native = connection.execute(query).await?;
    Ok(normalize(native, engine.row_id_strategy(), None))
}
