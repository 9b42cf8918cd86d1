use crate::{MssqlConnection, Pool, TiberiusManager};
use sluice_core::{Adapter, Config, Connection, Engine, Error, PoolSlot, Result, async_trait};
use tiberius::{AuthMethod, EncryptionLevel};

/// Named typed engine: `@paramN` bindings, identifiers read from an `OUTPUT` row.
pub struct MssqlAdapter {
    pool: PoolSlot<Pool>,
}

fn tiberius_config(config: &Config) -> Result<tiberius::Config> {
    let mut tds = tiberius::Config::new();
    tds.host(&config.host);
    tds.port(config.port()?);
    if !config.database.is_empty() {
        tds.database(&config.database);
    }
    if let Some(instance) = &config.instance_name {
        tds.instance_name(instance);
    }
    tds.authentication(AuthMethod::sql_server(&config.user, &config.password));
    match &config.ssl {
        Some(ssl) => {
            tds.encryption(EncryptionLevel::Required);
            if ssl.accept_invalid_certs {
                tds.trust_cert();
            } else if let Some(path) = &ssl.ca_file {
                tds.trust_cert_ca(path.to_string_lossy());
            }
        }
        None => tds.encryption(EncryptionLevel::NotSupported),
    }
    Ok(tds)
}

impl MssqlAdapter {
    /// Builds the pool, connections are opened on demand.
    pub fn new(config: &Config) -> Result<Self> {
        let manager = TiberiusManager {
            config: tiberius_config(config)?,
            named_instance: config.instance_name.is_some(),
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
            "Connected to mssql://{}:{}/{}",
            config.host,
            config.port()?,
            config.database
        );
        Ok(adapter)
    }
}

#[async_trait]
impl Adapter for MssqlAdapter {
    fn engine(&self) -> Engine {
        Engine::Mssql
    }

    async fn acquire(&self) -> Result<Box<dyn Connection>> {
        let client = self.pool.get()?.get().await.map_err(|e| {
            let error = Error::ConnectionUnavailable(format!(
                "While acquiring a connection from the pool: {e}"
            ));
            log::error!("{error}");
            error
        })?;
        Ok(Box::new(MssqlConnection { client }))
    }

    async fn close(&self) -> Result<()> {
        if let Some(pool) = self.pool.take() {
            pool.close();
        }
        Ok(())
    }
}
