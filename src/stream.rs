use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{level::Level, log_writer::LogWriter, row::Row};

/// Called with every row a stream records.
pub type RowHandler = Arc<dyn Fn(&Row) + Send + Sync>;
/// Called once when a stream is closed.
pub type CloseHandler = Arc<dyn Fn(&Stream) + Send + Sync>;

/// Capabilities shared by [`Stream`] and [`Group`](crate::Group).
///
/// Logging never fails: rows below the stream level are ignored, rows logged
/// after [`close`](LogStream::close) are dropped and writer errors are
/// swallowed.
///
/// Handlers must not log into the stream that invokes them. The row handler
/// runs while the stream lock is held and would deadlock.
pub trait LogStream {
    /// Replaces the writer rows are rendered to. `None` keeps rows in memory only.
    fn set_output(&self, output: Option<Arc<dyn LogWriter>>);
    /// Sets the prefix stamped on subsequent rows.
    fn set_prefix(&self, prefix: &str);
    fn set_row_handler(&self, handler: Option<RowHandler>);
    fn set_close_handler(&self, handler: Option<CloseHandler>);
    /// Snapshot of every row recorded so far, in insertion order.
    fn sequence(&self) -> Vec<Arc<Row>>;
    /// Closes the stream. Only the first call has an effect.
    fn close(&self);
    /// Records a row at `level`. The message is formatted only if the level
    /// passes the filter.
    fn log(&self, level: Level, args: fmt::Arguments<'_>);

    fn debug(&self, msg: impl fmt::Display)
    where
        Self: Sized,
    {
        self.log(Level::Debug, format_args!("{msg}"))
    }
    fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args)
    }
    fn info(&self, msg: impl fmt::Display)
    where
        Self: Sized,
    {
        self.log(Level::Info, format_args!("{msg}"))
    }
    fn infof(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args)
    }
    fn warn(&self, msg: impl fmt::Display)
    where
        Self: Sized,
    {
        self.log(Level::Warn, format_args!("{msg}"))
    }
    fn warnf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args)
    }
    fn error(&self, msg: impl fmt::Display)
    where
        Self: Sized,
    {
        self.log(Level::Error, format_args!("{msg}"))
    }
    fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args)
    }
}

struct StreamState {
    rows: Vec<Arc<Row>>,
    output: Option<Arc<dyn LogWriter>>,
    prefix: String,
    closed: bool,
    on_row: Option<RowHandler>,
    on_close: Option<CloseHandler>,
}

/// A sequential log channel keeping its own history of rows.
pub struct Stream {
    id: u64,
    level: Level,
    state: Mutex<StreamState>,
}

impl Stream {
    /// Creates a standalone stream, with identifier 0.
    pub fn new(level: Level, output: Option<Arc<dyn LogWriter>>) -> Self {
        Self::spawn(0, level, output, None, None)
    }

    /// A stream discarding everything.
    pub fn null() -> Self {
        Self::new(Level::None, None)
    }

    pub(crate) fn spawn(
        id: u64,
        level: Level,
        output: Option<Arc<dyn LogWriter>>,
        on_row: Option<RowHandler>,
        on_close: Option<CloseHandler>,
    ) -> Self {
        Self {
            id,
            level,
            state: Mutex::new(StreamState {
                rows: Vec::new(),
                output,
                prefix: String::new(),
                closed: false,
                on_row,
                on_close,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StreamState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Identifier assigned by the owning group, 0 for standalone streams.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn prefix(&self) -> String {
        self.lock().prefix.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub(crate) fn enabled(&self, level: Level) -> bool {
        level != Level::None && level >= self.level
    }

    /// Records a row, stamping it with `fallback_prefix` when the stream has no
    /// prefix of its own.
    pub(crate) fn record(
        &self,
        level: Level,
        fallback_prefix: Option<&str>,
        args: fmt::Arguments<'_>,
    ) {
        if !self.enabled(level) {
            return;
        }
        let message = args.to_string();
        let mut state = self.lock();
        if state.closed {
            return;
        }
        let prefix = match fallback_prefix {
            Some(prefix) if state.prefix.is_empty() => prefix,
            _ => state.prefix.as_str(),
        };
        let row = Arc::new(Row::new(level, prefix, message));
        state.rows.push(Arc::clone(&row));
        if let Some(output) = &state.output {
            output.write_row(&row).ok();
        }
        if let Some(handler) = &state.on_row {
            handler(&row);
        }
    }
}

impl LogStream for Stream {
    fn set_output(&self, output: Option<Arc<dyn LogWriter>>) {
        self.lock().output = output;
    }

    fn set_prefix(&self, prefix: &str) {
        self.lock().prefix = prefix.into();
    }

    fn set_row_handler(&self, handler: Option<RowHandler>) {
        self.lock().on_row = handler;
    }

    fn set_close_handler(&self, handler: Option<CloseHandler>) {
        self.lock().on_close = handler;
    }

    fn sequence(&self) -> Vec<Arc<Row>> {
        self.lock().rows.clone()
    }

    fn close(&self) {
        let handler = {
            let mut state = self.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            state.on_close.clone()
        };
        // Invoked unlocked so the handler can read this stream's history.
        if let Some(handler) = handler {
            handler(self);
        }
    }

    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        self.record(level, None, args)
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Stream")
            .field("id", &self.id)
            .field("level", &self.level)
            .field("prefix", &state.prefix)
            .field("rows", &state.rows.len())
            .field("closed", &state.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io,
        sync::atomic::{AtomicUsize, Ordering},
    };

    fn messages(stream: &Stream) -> Vec<String> {
        stream
            .sequence()
            .iter()
            .map(|row| row.message().to_string())
            .collect()
    }

    fn buffer_output(buffer: &Arc<Mutex<Vec<u8>>>) -> Option<Arc<dyn LogWriter>> {
        let output: Arc<dyn LogWriter> = buffer.clone();
        Some(output)
    }

    fn buffer_content(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn test_stream() {
        let s = Stream::new(Level::Debug, None);
        s.error(io::Error::other("This is Error"));
        s.info("This is Info");
        s.warn("This is Warn");
        s.debug("This is Debug");

        s.close();
        s.debug("This is useless");

        let rows = s.sequence();
        assert_eq!(rows.len(), 4);
        let levels: Vec<_> = rows.iter().map(|row| row.level()).collect();
        assert_eq!(
            levels,
            [Level::Error, Level::Info, Level::Warn, Level::Debug]
        );
        assert_eq!(
            messages(&s),
            ["This is Error", "This is Info", "This is Warn", "This is Debug"]
        );
    }

    #[test]
    fn test_level_filter() {
        let s = Stream::new(Level::Warn, None);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        s.set_row_handler(Some(Arc::new(move |_: &Row| {
            counter.fetch_add(1, Ordering::SeqCst);
        })));
        s.debug("a");
        s.info("b");
        s.warn("c");
        s.error("d");
        assert_eq!(messages(&s), ["c", "d"]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_null_stream_records_nothing() {
        let s = Stream::null();
        s.error("dropped");
        s.log(Level::None, format_args!("dropped"));
        assert!(s.sequence().is_empty());
        assert_eq!(s.id(), 0);
    }

    #[test]
    fn test_filtered_message_is_not_formatted() {
        struct Loud;
        impl fmt::Display for Loud {
            fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
                panic!("formatted a filtered message")
            }
        }
        let s = Stream::new(Level::Error, None);
        s.debug(Loud);
        s.infof(format_args!("{}", Loud));
        assert!(s.sequence().is_empty());
    }

    #[test]
    fn test_formatted_variants() {
        let s = Stream::new(Level::Debug, None);
        s.debugf(format_args!("{} + {} = {}", 1, 2, 1 + 2));
        s.infof(format_args!("user {}", "alice"));
        s.warnf(format_args!("{:>4}", 7));
        s.errorf(format_args!("failed: {}", "timeout"));
        crate::info!(s, "macro {}", 42);
        crate::error!(&s, "by {}", "reference");
        assert_eq!(
            messages(&s),
            ["1 + 2 = 3", "user alice", "   7", "failed: timeout", "macro 42", "by reference"]
        );
    }

    #[test]
    fn test_close_is_idempotent() {
        let s = Stream::new(Level::Debug, None);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        s.set_close_handler(Some(Arc::new(move |_: &Stream| {
            counter.fetch_add(1, Ordering::SeqCst);
        })));
        assert!(!s.is_closed());
        s.close();
        s.close();
        assert!(s.is_closed());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_handler_reads_history() {
        let s = Stream::new(Level::Debug, None);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        s.set_close_handler(Some(Arc::new(move |stream: &Stream| {
            sink.lock().unwrap().push(stream.sequence().len());
        })));
        s.info("one");
        s.info("two");
        s.close();
        assert_eq!(*seen.lock().unwrap(), [2]);
    }

    #[test]
    fn test_closed_stream_drops_every_level() {
        let s = Stream::new(Level::Debug, None);
        s.info("kept");
        s.close();
        s.debug("x");
        s.info("x");
        s.warn("x");
        s.error("x");
        assert_eq!(messages(&s), ["kept"]);
    }

    #[test]
    fn test_sequence_is_a_snapshot() {
        let s = Stream::new(Level::Debug, None);
        s.info("first");
        let mut snapshot = s.sequence();
        snapshot.clear();
        s.info("second");
        assert!(snapshot.is_empty());
        let again = s.sequence();
        assert_eq!(again.len(), 2);
        s.info("third");
        assert_eq!(again.len(), 2);
    }

    #[test]
    fn test_output_and_prefix() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let s = Stream::new(Level::Info, buffer_output(&buffer));
        s.set_prefix("auth");
        s.info("logged in");
        s.set_prefix("");
        s.warn("no prefix");
        s.set_output(None);
        s.error("memory only");

        let content = buffer_content(&buffer);
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[INFO ] auth logged in"));
        assert!(lines[1].ends_with("[WARN ]  no prefix"));
        assert_eq!(s.sequence().len(), 3);
        assert_eq!(s.sequence()[0].prefix(), "auth");
        assert_eq!(s.prefix(), "");
    }

    #[test]
    fn test_write_errors_are_swallowed() {
        struct Broken;
        impl LogWriter for Broken {
            fn write_row(&self, _: &Row) -> io::Result<()> {
                Err(io::Error::other("disk full"))
            }
        }
        let s = Stream::new(Level::Debug, Some(Arc::new(Broken)));
        s.error("still recorded");
        assert_eq!(messages(&s), ["still recorded"]);
    }

    #[test]
    fn test_row_handler_sees_rows_in_order() {
        let s = Stream::new(Level::Debug, None);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        s.set_row_handler(Some(Arc::new(move |row: &Row| {
            sink.lock().unwrap().push(row.message().to_string());
        })));
        s.info("a");
        s.warn("b");
        s.set_row_handler(None);
        s.error("c");
        assert_eq!(*seen.lock().unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_concurrent_logging() {
        let s = Arc::new(Stream::new(Level::Debug, None));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let s = s.clone();
                std::thread::spawn(move || {
                    for j in 0..100 {
                        s.infof(format_args!("thread {i} row {j}"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let rows = s.sequence();
        assert_eq!(rows.len(), 800);
        for i in 0..8 {
            let own: Vec<_> = rows
                .iter()
                .filter(|row| row.message().starts_with(&format!("thread {i} ")))
                .map(|row| row.message().to_string())
                .collect();
            let expected: Vec<_> = (0..100).map(|j| format!("thread {i} row {j}")).collect();
            assert_eq!(own, expected);
        }
    }
}
