use crate::PostgresConnection;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};
use postgres_openssl::MakeTlsConnector;
use sluice_core::{
    Adapter, Config, Connection, Engine, Error, PoolSlot, Result, SslConfig, async_trait,
};
use tokio_postgres::{NoTls, config::SslMode};

/// Sequential numbered engine: `$1..$n` placeholders, identifiers through `RETURNING`.
pub struct PostgresAdapter {
    pool: PoolSlot<Pool>,
}

fn tls_connector(ssl: &SslConfig) -> Result<MakeTlsConnector> {
    let context = "While building the TLS connector";
    let mut builder =
        SslConnector::builder(SslMethod::tls()).map_err(|e| Error::native(e, context))?;
    if let Some(path) = &ssl.ca_file {
        builder
            .set_ca_file(path)
            .map_err(|e| Error::native(e, format!("While loading `{}`", path.display())))?;
    }
    if ssl.accept_invalid_certs {
        builder.set_verify(SslVerifyMode::NONE);
    }
    Ok(MakeTlsConnector::new(builder.build()))
}

impl PostgresAdapter {
    /// Builds the pool, connections are opened on demand.
    pub fn new(config: &Config) -> Result<Self> {
        let mut pg = tokio_postgres::Config::new();
        pg.host(&config.host)
            .port(config.port()?)
            .dbname(&config.database);
        if !config.user.is_empty() {
            pg.user(&config.user);
        }
        if !config.password.is_empty() {
            pg.password(&config.password);
        }
        let manager_config = ManagerConfig {
            // Connections dropped inside a transaction come back rolled back
            recycling_method: RecyclingMethod::Custom("ROLLBACK".into()),
        };
        let manager = match &config.ssl {
            Some(ssl) => {
                pg.ssl_mode(SslMode::Require);
                Manager::from_config(pg, tls_connector(ssl)?, manager_config)
            }
            None => Manager::from_config(pg, NoTls, manager_config),
        };
        let pool = Pool::builder(manager)
            .max_size(config.pool_size.max(1))
            .build()
            .map_err(|e| Error::ConfigurationInvalid(e.to_string()))?;
        Ok(Self {
            pool: PoolSlot::new(pool),
        })
    }

    /// Builds the pool and checks that a connection can be established.
    pub async fn connect(config: &Config) -> Result<Self> {
        let adapter = Self::new(config)?;
        drop(adapter.acquire().await?);
        log::debug!(
            "Connected to postgres://{}:{}/{}",
            config.host,
            config.port()?,
            config.database
        );
        Ok(adapter)
    }
}

#[async_trait]
impl Adapter for PostgresAdapter {
    fn engine(&self) -> Engine {
        Engine::Postgres
    }

    async fn acquire(&self) -> Result<Box<dyn Connection>> {
        let client = self.pool.get()?.get().await.map_err(|e| {
            let error = Error::ConnectionUnavailable(format!(
                "While acquiring a connection from the pool: {e}"
            ));
            log::error!("{error}");
            error
        })?;
        Ok(Box::new(PostgresConnection { client }))
    }

    async fn close(&self) -> Result<()> {
        if let Some(pool) = self.pool.take() {
            pool.close();
        }
        Ok(())
    }
}
