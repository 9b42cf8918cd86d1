mod adapter;
mod as_value;
mod config;
mod connection;
mod engine;
mod error;
mod executor;
mod normalize;
mod param;
mod pool;
mod query;
mod render;
mod sql_type;
mod transaction;
mod translate;
mod util;
mod value;

pub use ::anyhow::Context;
pub use ::async_trait::async_trait;
pub use adapter::*;
pub use as_value::*;
pub use config::*;
pub use connection::*;
pub use engine::*;
pub use error::*;
pub use executor::*;
pub use normalize::*;
pub use param::*;
pub use pool::*;
pub use query::*;
pub use render::*;
pub use sql_type::*;
pub use transaction::*;
pub use translate::*;
pub use util::*;
pub use value::*;
pub use ::futures::future;
