//! # loggroup
//! Leveled log streams grouped under a shared writer. Every stream keeps its own
//! in-memory history of rows, so a request or a worker can inspect what it logged.
//!
//! ## Usage
//! ```toml
//! // Cargo.toml
//! ...
//! [dependencies]
//! loggroup = "0.1.0"
//! ```
//!
//! ```rust
//! use loggroup::{Level, LogStream, group_config};
//!
//! let group = group_config()
//!     .with_level(Level::Info)
//!     .build();
//! group.info("Hello, world!");
//!
//! // one stream per unit of work
//! let stream = group.new_stream();
//! stream.set_prefix("request-1");
//! loggroup::warn!(stream, "slow query: {}ms", 250);
//! stream.debug("not recorded");
//! stream.close();
//! assert_eq!(stream.sequence().len(), 1);
//! ```
//!
//! ## Multi-threaded logging
//! Streams and groups are `Sync`. Streams spawned from a group share its writer
//! and get increasing identifiers.
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use loggroup::{Group, Level, LogStream, LogWriter};
//!
//! let buffer = Arc::new(Mutex::new(Vec::new()));
//! let output: Arc<dyn LogWriter> = buffer.clone();
//! let group = Arc::new(Group::with_output(Level::Debug, Some(output)));
//!
//! let handles: Vec<_> = (0..5).map(|i| {
//!     let group = group.clone();
//!     std::thread::spawn(move || {
//!         let stream = group.new_stream();
//!         stream.set_prefix(&format!("thread {i}"));
//!         stream.info("Hello, world!");
//!         stream.close();
//!     })
//! }).collect();
//! for h in handles { h.join().unwrap(); }
//! let content = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
//! assert_eq!(content.lines().count(), 5);
//! ```
//!
//! ## Handlers
//! Row and close handlers configured on a group are installed on every stream it
//! spawns. A handler must never log into the stream invoking it.
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use loggroup::{LogStream, group_config};
//!
//! let closed = Arc::new(Mutex::new(Vec::new()));
//! let sink = closed.clone();
//! let group = group_config()
//!     .no_output()
//!     .with_close_handler(move |stream| {
//!         sink.lock().unwrap().push((stream.id(), stream.sequence().len()))
//!     })
//!     .build();
//! let stream = group.new_stream();
//! stream.error("failed");
//! stream.close();
//! assert_eq!(*closed.lock().unwrap(), [(2, 1)]);
//! ```
//!
//! ## Logging to files
//! ```rust
//! use loggroup::{Level, LogFile, LogStream, group_config};
//!
//! std::fs::remove_file("/tmp/loggroup_doc.log").ok();
//! let group = group_config()
//!     .with_level(Level::Debug)
//!     .with_output(LogFile::new("/tmp/loggroup_doc.log").expect("Unable to create log file"))
//!     .build();
//! group.info("Hello, world!");
//! assert!(std::fs::read_to_string("/tmp/loggroup_doc.log").unwrap().ends_with("Hello, world!\n"));
//! ```
//!
//! ## Environment
//! `LOGGROUP_LEVEL` sets the default level of [`group_config`] and
//! `LOGGROUP_COLOR` toggles coloured console output.

mod bridge;
mod config;
mod group;
mod level;
mod log_writer;
mod row;
mod stream;

pub use bridge::LogBridge;
pub use config::{LOGGROUP_CONFIG, LogGroupConfig};
pub use group::{ConfigBuilder, Group, group_config};
pub use level::Level;
pub use log_writer::{LogFile, LogStderr, LogStdout, LogWriter};
pub use row::Row;
pub use stream::{CloseHandler, LogStream, RowHandler, Stream};

/// Logs a formatted message at debug level: `debug!(stream, "x = {}", x)`.
#[macro_export]
macro_rules! debug {
    ($stream:expr, $($arg:tt)+) => {{
        use $crate::LogStream as _;
        ($stream).debugf(format_args!($($arg)+))
    }};
}

/// Logs a formatted message at info level.
#[macro_export]
macro_rules! info {
    ($stream:expr, $($arg:tt)+) => {{
        use $crate::LogStream as _;
        ($stream).infof(format_args!($($arg)+))
    }};
}

/// Logs a formatted message at warn level.
#[macro_export]
macro_rules! warn {
    ($stream:expr, $($arg:tt)+) => {{
        use $crate::LogStream as _;
        ($stream).warnf(format_args!($($arg)+))
    }};
}

/// Logs a formatted message at error level.
#[macro_export]
macro_rules! error {
    ($stream:expr, $($arg:tt)+) => {{
        use $crate::LogStream as _;
        ($stream).errorf(format_args!($($arg)+))
    }};
}
