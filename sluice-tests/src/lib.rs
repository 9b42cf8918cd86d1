mod bulk;
mod items;
mod memory;
mod multiple;
mod procedures;
mod statements;
mod transactions;

use crate::{bulk::bulk, multiple::multiple, statements::statements, transactions::transactions};
use log::LevelFilter;
pub use memory::*;
pub use procedures::procedures;
use sluice::Database;
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Runs the common suite against a configured database.
pub async fn execute_tests(database: &Database) {
    statements(database).await;
    transactions(database).await;
    bulk(database).await;
    multiple(database).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
