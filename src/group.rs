use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    config::LOGGROUP_CONFIG,
    level::Level,
    log_writer::{LogStderr, LogWriter},
    row::Row,
    stream::{CloseHandler, LogStream, RowHandler, Stream},
};

/// Factory for streams sharing a level, a writer and a pair of handlers.
///
/// A group is itself usable as a stream: every [`LogStream`] call goes to the
/// default stream created along with the group.
pub struct Group {
    level: Level,
    output: Option<Arc<dyn LogWriter>>,
    on_close: Option<CloseHandler>,
    on_row: Option<RowHandler>,
    id_counter: Mutex<u64>,
    stream: Stream,
}

impl Group {
    fn from_parts(
        level: Level,
        output: Option<Arc<dyn LogWriter>>,
        on_close: Option<CloseHandler>,
        on_row: Option<RowHandler>,
    ) -> Self {
        let mut group = Self {
            level,
            output,
            on_close,
            on_row,
            id_counter: Mutex::new(0),
            stream: Stream::null(),
        };
        group.stream = group.new_stream();
        group
    }

    /// Group writing to stderr.
    pub fn new(level: Level) -> Self {
        Self::with_output(level, Some(Arc::new(LogStderr::default())))
    }

    /// Group discarding everything.
    pub fn null() -> Self {
        Self::from_parts(Level::None, None, None, None)
    }

    pub fn with_output(level: Level, output: Option<Arc<dyn LogWriter>>) -> Self {
        Self::from_parts(level, output, None, None)
    }

    pub fn with_handlers(
        level: Level,
        output: Option<Arc<dyn LogWriter>>,
        on_close: Option<CloseHandler>,
        on_row: Option<RowHandler>,
    ) -> Self {
        Self::from_parts(level, output, on_close, on_row)
    }

    /// Spawns a stream inheriting this group's level, writer and handlers.
    /// The group keeps no reference to it; closing it is up to the caller.
    pub fn new_stream(&self) -> Stream {
        let id = {
            let mut counter = self
                .id_counter
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *counter += 1;
            *counter
        };
        Stream::spawn(
            id,
            self.level,
            self.output.clone(),
            self.on_row.clone(),
            self.on_close.clone(),
        )
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// The default stream backing this group's own logging calls.
    pub fn stream(&self) -> &Stream {
        &self.stream
    }
}

impl LogStream for Group {
    fn set_output(&self, output: Option<Arc<dyn LogWriter>>) {
        self.stream.set_output(output)
    }

    fn set_prefix(&self, prefix: &str) {
        self.stream.set_prefix(prefix)
    }

    fn set_row_handler(&self, handler: Option<RowHandler>) {
        self.stream.set_row_handler(handler)
    }

    fn set_close_handler(&self, handler: Option<CloseHandler>) {
        self.stream.set_close_handler(handler)
    }

    fn sequence(&self) -> Vec<Arc<Row>> {
        self.stream.sequence()
    }

    fn close(&self) {
        self.stream.close()
    }

    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        self.stream.log(level, args)
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("level", &self.level)
            .field("output", &self.output.is_some())
            .field("stream", &self.stream)
            .finish()
    }
}

/// Builder for configuring a [`Group`].
pub struct ConfigBuilder {
    level: Level,
    output: Option<Arc<dyn LogWriter>>,
    on_close: Option<CloseHandler>,
    on_row: Option<RowHandler>,
    prefix: Option<String>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            level: LOGGROUP_CONFIG.level(),
            output: Some(Arc::new(LogStderr::default())),
            on_close: None,
            on_row: None,
            prefix: None,
        }
    }
}

impl ConfigBuilder {
    /// Sets the minimum level.
    pub fn with_level(self, level: Level) -> Self {
        Self { level, ..self }
    }
    /// Sets the minimum level from its name, see [`Level::parse`].
    pub fn with_level_str(self, level: &str) -> Self {
        Self {
            level: Level::parse(level),
            ..self
        }
    }
    /// Sets the writer shared by every stream of the group.
    pub fn with_output<W: LogWriter + 'static>(self, output: W) -> Self {
        Self {
            output: Some(Arc::new(output)),
            ..self
        }
    }
    /// Shares an existing writer.
    pub fn with_shared_output(self, output: Arc<dyn LogWriter>) -> Self {
        Self {
            output: Some(output),
            ..self
        }
    }
    /// Keep rows in memory only.
    pub fn no_output(self) -> Self {
        Self {
            output: None,
            ..self
        }
    }
    pub fn with_close_handler<F>(self, handler: F) -> Self
    where
        F: Fn(&Stream) + Send + Sync + 'static,
    {
        Self {
            on_close: Some(Arc::new(handler)),
            ..self
        }
    }
    pub fn with_row_handler<F>(self, handler: F) -> Self
    where
        F: Fn(&Row) + Send + Sync + 'static,
    {
        Self {
            on_row: Some(Arc::new(handler)),
            ..self
        }
    }
    /// Prefix of the group's default stream.
    pub fn with_prefix(self, prefix: &str) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..self
        }
    }
    pub fn build(self) -> Group {
        let Self {
            level,
            output,
            on_close,
            on_row,
            prefix,
        } = self;
        let group = Group::from_parts(level, output, on_close, on_row);
        if let Some(prefix) = prefix {
            group.set_prefix(&prefix);
        }
        group
    }
}

/// Returns a default ConfigBuilder, honouring `LOGGROUP_LEVEL` and `LOGGROUP_COLOR`.
pub fn group_config() -> ConfigBuilder {
    ConfigBuilder::default()
}
