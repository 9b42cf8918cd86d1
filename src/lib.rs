mod backend;
mod database;

pub use database::*;
pub use sluice_core::*;
#[cfg(feature = "mssql")]
pub use sluice_mssql as mssql;
#[cfg(feature = "mysql")]
pub use sluice_mysql as mysql;
#[cfg(feature = "postgres")]
pub use sluice_postgres as postgres;
