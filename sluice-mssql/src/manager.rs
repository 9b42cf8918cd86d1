use deadpool::managed::{self, Metrics, RecycleResult};
use tiberius::{Client, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

pub(crate) type TdsClient = Client<Compat<TcpStream>>;
pub(crate) type Pool = managed::Pool<TiberiusManager>;

/// Opens TDS sessions for the pool.
pub(crate) struct TiberiusManager {
    pub(crate) config: tiberius::Config,
    /// Resolve the port through the SQL Browser service.
    pub(crate) named_instance: bool,
}

impl managed::Manager for TiberiusManager {
    type Type = TdsClient;
    type Error = tiberius::error::Error;

    async fn create(&self) -> Result<TdsClient, Self::Error> {
        let tcp = if self.named_instance {
            TcpStream::connect_named(&self.config).await?
        } else {
            TcpStream::connect(self.config.get_addr()).await?
        };
        tcp.set_nodelay(true)?;
        Client::connect(self.config.clone(), tcp.compat_write()).await
    }

    async fn recycle(&self, client: &mut TdsClient, _: &Metrics) -> RecycleResult<Self::Error> {
        // Sessions dropped inside a transaction come back rolled back
        client
            .simple_query("IF @@TRANCOUNT > 0 ROLLBACK")
            .await?
            .into_results()
            .await?;
        Ok(())
    }
}
