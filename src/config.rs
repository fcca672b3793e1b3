use std::sync::LazyLock;

use derive_from_env::FromEnv;

use crate::level::Level;

/// Raw `LOGGROUP_*` variables. Each is kept as text and folded by its accessor,
/// so one malformed variable never discards the others.
#[derive(FromEnv)]
#[from_env(prefix = "LOGGROUP")]
#[allow(non_snake_case)]
pub struct LogGroupConfig {
    #[from_env(default = "DEBUG")]
    pub LEVEL: String,
    #[from_env(default = "true")]
    pub COLOR: String,
}

impl Default for LogGroupConfig {
    fn default() -> Self {
        Self {
            LEVEL: Level::Debug.as_str().into(),
            COLOR: "true".into(),
        }
    }
}

impl LogGroupConfig {
    /// Minimum level requested through `LOGGROUP_LEVEL`.
    pub fn level(&self) -> Level {
        Level::parse(&self.LEVEL)
    }

    /// Whether console writers colour the level tag. Unrecognized values keep
    /// colours on.
    pub fn color(&self) -> bool {
        !matches!(
            self.COLOR.trim().to_ascii_lowercase().as_str(),
            "false" | "0" | "no" | "off"
        )
    }
}

/// Configuration read once from the environment.
pub static LOGGROUP_CONFIG: LazyLock<LogGroupConfig> =
    LazyLock::new(|| LogGroupConfig::from_env().unwrap_or_default());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogGroupConfig::default();
        assert_eq!(config.level(), Level::Debug);
        assert!(config.color());
    }

    #[test]
    fn test_level_from_config_text() {
        let config = LogGroupConfig {
            LEVEL: "warning".into(),
            COLOR: "off".into(),
        };
        assert_eq!(config.level(), Level::Warn);
        assert!(!config.color());
    }

    #[test]
    fn test_color_values() {
        let color = |value: &str| {
            LogGroupConfig {
                LEVEL: "DEBUG".into(),
                COLOR: value.into(),
            }
            .color()
        };
        for value in ["true", "1", "yes", "ON", "bogus", ""] {
            assert!(color(value), "{value}");
        }
        for value in ["false", "0", "No", " off "] {
            assert!(!color(value), "{value}");
        }
    }

    #[test]
    fn test_from_env_keeps_level_next_to_bad_color() {
        // SAFETY: no other test in this crate writes the environment.
        unsafe {
            std::env::set_var("LOGGROUP_LEVEL", "ERROR");
            std::env::set_var("LOGGROUP_COLOR", "maybe");
        }
        let config = LogGroupConfig::from_env().unwrap_or_default();
        unsafe {
            std::env::remove_var("LOGGROUP_LEVEL");
            std::env::remove_var("LOGGROUP_COLOR");
        }
        assert_eq!(config.level(), Level::Error);
        assert!(config.color());
    }
}
