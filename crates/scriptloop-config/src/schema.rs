//! Configuration schema definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use scriptloop_daemon::DaemonConfig;
pub use scriptloop_runloop::RunLoopConfig;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub runloop: RunLoopConfig,

    #[serde(default)]
    pub daemon: DaemonConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// `~/.scriptloop/config.toml`, falling back to the working directory.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".scriptloop").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("scriptloop.toml"))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `scriptloop_runloop=debug,info`.
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for daily-rotated log files. Console only when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Colored console output.
    #[serde(default = "default_ansi")]
    pub ansi: bool,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_ansi() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
            ansi: default_ansi(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.runloop, RunLoopConfig::default());
        assert!(config.daemon.single_instance);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.dir.is_none());
        assert!(config.logging.ansi);
    }

    #[test]
    fn test_default_path() {
        assert!(Config::default_path().to_string_lossy().ends_with(".toml"));
    }

    #[test]
    fn test_logging_partial_table() {
        let logging: LoggingConfig = toml::from_str("ansi = false").unwrap();
        assert!(!logging.ansi);
        assert_eq!(logging.level, "info");
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let mut config = Config::default();
        config.runloop.termination_delay_ms = 2500;
        config.logging.dir = Some(PathBuf::from("/var/log/scriptloop"));

        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
