mod adapter;
mod connection;
mod procedure;
mod value_holder;

pub use adapter::*;
pub use connection::*;
pub(crate) use procedure::*;
pub(crate) use value_holder::*;
