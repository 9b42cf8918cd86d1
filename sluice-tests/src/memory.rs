use sluice::{
    Adapter, Bindings, Connection, Direction, Engine, Error, ExecutionResult, NativeResult,
    Parameter, ProcedureResult, Result, RowLabeled, RowNames, RowSet, TranslatedQuery, Value,
    async_trait, contains_ignore_ascii_case, execute_bulk,
};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

/// Phases where a failure can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Acquire,
    Begin,
    Commit,
    Rollback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: i64,
    pub name: String,
}

#[derive(Default)]
struct MemoryState {
    queries: Vec<TranslatedQuery>,
    events: Vec<&'static str>,
    responses: VecDeque<Result<NativeResult>>,
    procedures: Vec<(String, Vec<Parameter>)>,
    faults: Vec<Fault>,
    failing_statements: Vec<String>,
    acquired: usize,
    released: usize,
    items: Vec<Item>,
    next_id: i64,
}

/// Scripted engine keeping everything in memory.
///
/// It records every statement it receives, already translated for the engine it poses as,
/// and answers either with queued responses or by interpreting the statement against a
/// single table of items (`id`, `name`):
/// - `INSERT` adds one item for every bound value
/// - `SELECT` returns the items, filtered by name when a value is bound or quoted
/// - `DELETE` removes the items, filtered by name when a value is bound or quoted
///
/// Changes made inside a transaction become visible to other connections on commit only.
#[derive(Clone)]
pub struct MemoryAdapter {
    engine: Engine,
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryAdapter {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            state: Arc::new(Mutex::new(MemoryState {
                next_id: 1,
                ..Default::default()
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        lock(&self.state)
    }

    /// Answer of the next executed statement, consumed in FIFO order.
    pub fn push_response(&self, response: Result<NativeResult>) -> &Self {
        self.state().responses.push_back(response);
        self
    }

    pub fn inject(&self, fault: Fault) -> &Self {
        self.state().faults.push(fault);
        self
    }

    /// Statements containing `pattern` (case insensitive) fail with a native error.
    pub fn fail_statements_containing(&self, pattern: impl Into<String>) -> &Self {
        self.state().failing_statements.push(pattern.into());
        self
    }

    pub fn queries(&self) -> Vec<TranslatedQuery> {
        self.state().queries.clone()
    }

    pub fn last_query(&self) -> Option<TranslatedQuery> {
        self.state().queries.last().cloned()
    }

    /// Transaction commands in the order received: `BEGIN`, `COMMIT`, `ROLLBACK`.
    pub fn events(&self) -> Vec<&'static str> {
        self.state().events.clone()
    }

    pub fn procedures(&self) -> Vec<(String, Vec<Parameter>)> {
        self.state().procedures.clone()
    }

    pub fn acquired(&self) -> usize {
        self.state().acquired
    }

    pub fn released(&self) -> usize {
        self.state().released
    }

    /// Committed items.
    pub fn items(&self) -> Vec<Item> {
        self.state().items.clone()
    }

    pub fn assert_last_query(&self, sql: &str) {
        let last = self.last_query().map(|v| v.sql);
        assert_eq!(last.as_deref(), Some(sql), "Unexpected last query");
    }
}

fn lock(state: &Mutex<MemoryState>) -> MutexGuard<'_, MemoryState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

fn take_fault(state: &mut MemoryState, fault: Fault) -> Result<()> {
    if let Some(i) = state.faults.iter().position(|v| *v == fault) {
        state.faults.remove(i);
        return Err(match fault {
            Fault::Acquire => Error::ConnectionUnavailable("Connection pool exhausted.".into()),
            _ => Error::native(
                Error::Unsupported(format!("{fault:?} refused")),
                format!("While running {fault:?}"),
            ),
        });
    }
    Ok(())
}

#[async_trait]
impl Adapter for MemoryAdapter {
    fn engine(&self) -> Engine {
        self.engine
    }

    async fn acquire(&self) -> Result<Box<dyn Connection>> {
        let mut state = self.state();
        take_fault(&mut state, Fault::Acquire)?;
        state.acquired += 1;
        Ok(Box::new(MemoryConnection {
            engine: self.engine,
            state: self.state.clone(),
            transaction: None,
        }))
    }

    async fn run_bulk_insert(
        &self,
        sql: &str,
        rows: Vec<Vec<Value>>,
    ) -> Result<ExecutionResult> {
        if self.engine != Engine::MySql {
            return Err(Error::Unsupported(format!(
                "bulk insert is not supported by {}",
                self.engine
            )));
        }
        let mut connection = self.acquire().await?;
        execute_bulk(connection.as_mut(), self.engine, sql, rows).await
    }
}

pub struct MemoryConnection {
    engine: Engine,
    state: Arc<Mutex<MemoryState>>,
    /// Working copy of the items while a transaction is open.
    transaction: Option<Vec<Item>>,
}

impl MemoryConnection {
    /// Every `;` separated statement sees the same bound values.
    fn interpret(&mut self, state: &mut MemoryState, query: &TranslatedQuery) -> NativeResult {
        let values: Vec<Value> = match &query.bindings {
            Bindings::Positional(v) => v.clone(),
            Bindings::Named(v) => v.iter().map(|b| b.value.clone()).collect(),
        };
        let mut result = NativeResult::default();
        for sql in query.sql.split(';').filter(|v| !v.trim().is_empty()) {
            let native = self.interpret_statement(state, sql.trim(), values.clone());
            result.result_sets.extend(native.result_sets);
            result.rows_affected += native.rows_affected;
            if native.last_insert_id.is_some() {
                result.last_insert_id = native.last_insert_id;
            }
        }
        result
    }

    fn interpret_statement(
        &mut self,
        state: &mut MemoryState,
        sql: &str,
        values: Vec<Value>,
    ) -> NativeResult {
        let filter = values
            .first()
            .and_then(Value::as_str)
            .map(str::to_owned)
            .or_else(|| quoted_name(sql));
        let keyword = sql
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();
        let items = match &mut self.transaction {
            Some(v) => v,
            None => &mut state.items,
        };
        match keyword.as_str() {
            "INSERT" => {
                let first = state.next_id;
                let mut inserted = Vec::with_capacity(values.len());
                for value in values {
                    let item = Item {
                        id: state.next_id,
                        name: value.to_string(),
                    };
                    state.next_id += 1;
                    inserted.push(item.clone());
                    items.push(item);
                }
                let returns = match self.engine {
                    Engine::MySql => false,
                    Engine::Postgres => contains_ignore_ascii_case(sql, "returning"),
                    Engine::Mssql => contains_ignore_ascii_case(sql, "output"),
                };
                NativeResult {
                    rows_affected: inserted.len() as u64,
                    result_sets: if returns {
                        vec![to_rows(&inserted)]
                    } else {
                        Vec::new()
                    },
                    last_insert_id: (self.engine == Engine::MySql && !inserted.is_empty())
                        .then_some(first as u64),
                }
            }
            "SELECT" => {
                let rows: Vec<_> = items
                    .iter()
                    .filter(|v| filter.as_ref().is_none_or(|f| v.name == *f))
                    .cloned()
                    .collect();
                NativeResult::with_rows(to_rows(&rows))
            }
            "DELETE" => {
                let before = items.len();
                items.retain(|v| filter.as_ref().is_some_and(|f| v.name != *f));
                NativeResult {
                    rows_affected: (before - items.len()) as u64,
                    ..Default::default()
                }
            }
            _ => NativeResult::default(),
        }
    }
}

/// Literal of a `name = '...'` condition.
fn quoted_name(sql: &str) -> Option<String> {
    let (_, rest) = sql.split_once("name = '")?;
    rest.split_once('\'').map(|(v, _)| v.to_owned())
}

fn to_rows(items: &[Item]) -> RowSet {
    let labels: RowNames = Arc::from(vec!["id".to_string(), "name".to_string()]);
    items
        .iter()
        .map(|v| {
            RowLabeled::new(
                labels.clone(),
                Box::new([Value::Int64(v.id), Value::Varchar(v.name.clone())]),
            )
        })
        .collect()
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn execute(&mut self, query: TranslatedQuery) -> Result<NativeResult> {
        let state = self.state.clone();
        let mut state = lock(&state);
        state.queries.push(query.clone());
        if let Some(response) = state.responses.pop_front() {
            return response;
        }
        if let Some(pattern) = state
            .failing_statements
            .iter()
            .find(|v| contains_ignore_ascii_case(&query.sql, v))
        {
            return Err(Error::native(
                Error::Unsupported(format!("statement matching `{pattern}` refused")),
                format!("While running the query:\n{}", query.sql),
            ));
        }
        Ok(self.interpret(&mut state, &query))
    }

    async fn begin(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.events.push("BEGIN");
        take_fault(&mut state, Fault::Begin)?;
        self.transaction = Some(state.items.clone());
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.events.push("COMMIT");
        let working = self.transaction.take();
        take_fault(&mut state, Fault::Commit)?;
        if let Some(items) = working {
            state.items = items;
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.events.push("ROLLBACK");
        self.transaction = None;
        take_fault(&mut state, Fault::Rollback)
    }

    async fn call_procedure(
        &mut self,
        name: &str,
        parameters: &[Parameter],
    ) -> Result<ProcedureResult> {
        let mut state = lock(&self.state);
        state.procedures.push((name.to_owned(), parameters.to_vec()));
        let inputs: Vec<_> = parameters
            .iter()
            .filter(|p| p.direction == Direction::Input)
            .collect();
        let labels: RowNames = inputs.iter().map(|p| p.name.to_string()).collect();
        let values = inputs.iter().map(|p| p.value.clone()).collect();
        Ok(ProcedureResult {
            result_sets: vec![vec![RowLabeled::new(labels, values)]],
            return_value: Some(Value::Int64(inputs.len() as i64)),
            output: parameters
                .iter()
                .filter(|p| p.is_output())
                .map(|p| (p.name.to_string(), p.value.clone()))
                .collect(),
        })
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        lock(&self.state).released += 1;
    }
}
