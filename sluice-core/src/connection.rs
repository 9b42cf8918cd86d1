use crate::{Error, NativeResult, Parameter, ProcedureResult, Result, TranslatedQuery};
use async_trait::async_trait;

/// A connection exclusively borrowed from an engine pool.
///
/// Dropping it gives it back to the pool, every exit path releases it.
#[async_trait]
pub trait Connection: Send {
    /// Sends an already translated statement.
    async fn execute(&mut self, query: TranslatedQuery) -> Result<NativeResult>;

    async fn begin(&mut self) -> Result<()>;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;

    async fn call_procedure(
        &mut self,
        name: &str,
        parameters: &[Parameter],
    ) -> Result<ProcedureResult> {
        let _ = parameters;
        Err(Error::Unsupported(format!(
            "stored procedure `{name}` cannot be executed by this engine"
        )))
    }
}
