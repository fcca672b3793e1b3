use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use colored::Colorize;

use crate::level::Level;

/// A single recorded log event. Fields are read-only once the row is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    time: DateTime<Utc>,
    level: Level,
    prefix: String,
    message: String,
}

impl Row {
    /// Creates a row stamped with the current time.
    pub fn new(level: Level, prefix: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            time: Utc::now(),
            level,
            prefix: prefix.into(),
            message: message.into(),
        }
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn timestamp(&self) -> String {
        self.time.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    /// Same layout as the `Display` rendering, with the level tag coloured for
    /// terminal output.
    pub fn colored(&self) -> String {
        let tag = format!("{:<5}", self.level);
        let tag = match self.level {
            Level::Error => tag.red(),
            Level::Warn => tag.yellow(),
            Level::Info => tag.green(),
            Level::Debug => tag.blue(),
            Level::None => tag.normal(),
        };
        format!(
            "{:<32} [{tag}] {} {}",
            self.timestamp(),
            self.prefix,
            self.message
        )
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<32} [{:<5}] {} {}",
            self.timestamp(),
            self.level,
            self.prefix,
            self.message
        )
    }
}
