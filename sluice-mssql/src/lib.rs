mod adapter;
mod batch;
mod connection;
mod manager;
mod value_wrap;

pub use adapter::*;
pub(crate) use batch::*;
pub use connection::*;
pub(crate) use manager::*;
pub(crate) use value_wrap::*;
