use crate::MySqlConnection;
use mysql_async::{OptsBuilder, Pool, PoolConstraints, PoolOpts, SslOpts};
use sluice_core::{
    Adapter, Config, Connection, Engine, Error, ExecutionResult, PoolSlot, Result, Value,
    async_trait, execute_bulk,
};

/// Row oriented engine: `?` placeholders, auto-increment identifiers, native bulk insert.
pub struct MySqlAdapter {
    pool: PoolSlot<Pool>,
    multiple_statements: bool,
}

impl MySqlAdapter {
    /// Builds the pool, connections are opened on demand.
    pub fn new(config: &Config) -> Result<Self> {
        let constraints = PoolConstraints::new(1.min(config.pool_size), config.pool_size.max(1))
            .ok_or_else(|| {
                Error::ConfigurationInvalid(format!("invalid pool size {}", config.pool_size))
            })?;
        let mut options = OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port()?)
            .user(Some(config.user.clone()).filter(|v| !v.is_empty()))
            .pass(Some(config.password.clone()).filter(|v| !v.is_empty()))
            .db_name(Some(config.database.clone()).filter(|v| !v.is_empty()))
            .pool_opts(PoolOpts::default().with_constraints(constraints));
        if let Some(ssl) = &config.ssl {
            let mut ssl_opts =
                SslOpts::default().with_danger_accept_invalid_certs(ssl.accept_invalid_certs);
            if let Some(path) = &ssl.ca_file {
                ssl_opts = ssl_opts.with_root_certs(vec![path.clone().into()]);
            }
            options = options.ssl_opts(Some(ssl_opts));
        }
        Ok(Self {
            pool: PoolSlot::new(Pool::new(options)),
            multiple_statements: config.multiple_statements,
        })
    }

    /// Builds the pool and checks that a connection can be established.
    pub async fn connect(config: &Config) -> Result<Self> {
        let adapter = Self::new(config)?;
        drop(adapter.acquire().await?);
        log::debug!(
            "Connected to mysql://{}:{}/{}",
            config.host,
            config.port()?,
            config.database
        );
        Ok(adapter)
    }
}

#[async_trait]
impl Adapter for MySqlAdapter {
    fn engine(&self) -> Engine {
        Engine::MySql
    }

    async fn acquire(&self) -> Result<Box<dyn Connection>> {
        let conn = self.pool.get()?.get_conn().await.map_err(|e| {
            let error = Error::ConnectionUnavailable(format!(
                "While acquiring a connection from the pool: {e}"
            ));
            log::error!("{error}");
            error
        })?;
        Ok(Box::new(MySqlConnection {
            conn,
            multiple_statements: self.multiple_statements,
        }))
    }

    async fn close(&self) -> Result<()> {
        if let Some(pool) = self.pool.take() {
            pool.disconnect()
                .await
                .map_err(|e| Error::native(e, "While closing the pool"))?;
        }
        Ok(())
    }

    async fn run_bulk_insert(&self, sql: &str, rows: Vec<Vec<Value>>) -> Result<ExecutionResult> {
        let mut connection = self.acquire().await?;
        execute_bulk(connection.as_mut(), Engine::MySql, sql, rows).await
    }
}
