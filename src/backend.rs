use sluice_core::{Adapter, Config, Engine, Error, Result};
use std::sync::Arc;

/// Builds the adapter of the engine named by `config`, its pool is connected and verified.
pub(crate) async fn create_adapter(config: &Config) -> Result<Arc<dyn Adapter>> {
    let engine = config.engine()?;
    match engine {
        #[cfg(feature = "mysql")]
        Engine::MySql => Ok(Arc::new(sluice_mysql::MySqlAdapter::connect(config).await?)),
        #[cfg(feature = "postgres")]
        Engine::Postgres => Ok(Arc::new(
            sluice_postgres::PostgresAdapter::connect(config).await?,
        )),
        #[cfg(feature = "mssql")]
        Engine::Mssql => Ok(Arc::new(sluice_mssql::MssqlAdapter::connect(config).await?)),
        #[allow(unreachable_patterns)]
        engine => Err(Error::ConfigurationInvalid(format!(
            "the {engine} engine is not enabled, build sluice with the `{}` feature",
            engine.name()
        ))),
    }
}
