use std::{convert::Infallible, fmt, str::FromStr};

use log::LevelFilter;

/// Severity of a log row. Variants are ordered from the most verbose to the
/// least, `None` being a sentinel that filters everything out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    #[default]
    Debug,
    Info,
    Warn,
    Error,
    None,
}

impl Level {
    /// Parses a level name, ignoring case and surrounding whitespace.
    /// Unrecognized names fall back to `Debug`.
    pub fn parse(s: &str) -> Level {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Level::Debug,
            "INFO" | "INFORMATION" => Level::Info,
            "WARN" | "WARNING" => Level::Warn,
            "ERR" | "ERROR" => Level::Error,
            "NONE" | "NIL" | "NULL" => Level::None,
            _ => Level::Debug,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::None => "unknown",
        }
    }

    /// Maximum `log` filter letting through every row this level accepts.
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Level::Debug => LevelFilter::Trace,
            Level::Info => LevelFilter::Info,
            Level::Warn => LevelFilter::Warn,
            Level::Error => LevelFilter::Error,
            Level::None => LevelFilter::Off,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Level::parse(s))
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warn,
            log::Level::Info => Level::Info,
            log::Level::Debug | log::Level::Trace => Level::Debug,
        }
    }
}
