use std::sync::Arc;

use loggroup::{LogBridge, LogStream, group_config};

fn main() {
    let group = Arc::new(group_config().with_level_str("info").build());
    LogBridge::new(group.clone())
        .init()
        .expect("Unable to install logger");
    log::info!("Hello, world!");
    log::debug!("filtered out");
    log::error!(target: "db", "connection lost");
    for row in group.sequence() {
        println!("recorded: {} {}", row.level(), row.message());
    }
}
