use std::sync::Arc;

use log::{Log, Metadata, Record, SetLoggerError};

use crate::{group::Group, level::Level};

/// Routes records of the `log` facade into a group's default stream.
///
/// Rows are stamped with the record target unless the stream has a prefix.
pub struct LogBridge {
    group: Arc<Group>,
}

impl LogBridge {
    pub fn new(group: Arc<Group>) -> Self {
        Self { group }
    }

    /// Installs the bridge as the global `log` backend.
    pub fn init(self) -> Result<(), SetLoggerError> {
        let max_level = self.group.level().to_level_filter();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.group.stream().enabled(Level::from(metadata.level()))
    }

    fn log(&self, record: &Record) {
        self.group.stream().record(
            Level::from(record.level()),
            Some(record.target()),
            *record.args(),
        );
    }

    fn flush(&self) {}
}
