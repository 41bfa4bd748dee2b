//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: Config = toml::from_str(&expanded)?;
        Self::expand_paths(&mut config);
        Ok(config)
    }

    /// Load `path` if given, otherwise the default location.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let path = Config::default_path();
                if path.exists() {
                    Self::load(&path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    /// Expand environment variables in the format `${VAR}`.
    ///
    /// Whole-line `#` comments are left as written, so a commented-out
    /// reference to an unset variable does not fail the load. Trailing
    /// comments after a value are still expanded.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        let mut result = String::with_capacity(content.len());

        for line in content.split_inclusive('\n') {
            if line.trim_start().starts_with('#') {
                result.push_str(line);
                continue;
            }

            let mut expanded = line.to_string();
            for cap in re.captures_iter(line) {
                let var_name = &cap[1];
                let var_value = std::env::var(var_name)
                    .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
                expanded = expanded.replace(&cap[0], &var_value);
            }
            result.push_str(&expanded);
        }

        Ok(result)
    }

    fn expand_paths(config: &mut Config) {
        config.daemon.pid_file = Self::expand_pathbuf(&config.daemon.pid_file);
        if let Some(dir) = config.logging.dir.as_mut() {
            *dir = Self::expand_pathbuf(dir);
        }
    }

    fn expand_pathbuf(path: &Path) -> PathBuf {
        PathBuf::from(Self::expand_path(&path.to_string_lossy()))
    }

    /// Expand shell-style paths (e.g., `~/.scriptloop`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_runloop_section() {
        let content = r#"
            [runloop]
            termination_delay_ms = 5000
            meta_threads = 4
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.runloop.termination_delay(), Duration::from_secs(5));
        assert_eq!(config.runloop.meta_threads, 4);
        assert_eq!(config.runloop.max_work_threads, 64);
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
            [runloop]
            termination_delay_ms = 250

            [daemon]
            pid_file = "/run/scriptloop.pid"
            single_instance = false
            handle_signals = false

            [logging]
            level = "debug"
            dir = "/var/log/scriptloop"
            ansi = false
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.daemon.pid_file, PathBuf::from("/run/scriptloop.pid"));
        assert!(!config.daemon.single_instance);
        assert!(!config.daemon.handle_signals);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.dir, Some(PathBuf::from("/var/log/scriptloop")));
        assert!(!config.logging.ansi);
    }

    #[test]
    fn test_tilde_paths_expanded() {
        let content = r#"
            [daemon]
            pid_file = "~/.scriptloop/test.pid"

            [logging]
            dir = "~/logs"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert!(!config.daemon.pid_file.starts_with("~"));
        assert!(config.daemon.pid_file.ends_with(".scriptloop/test.pid"));
        assert!(!config.logging.dir.unwrap().starts_with("~"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[runloop]").unwrap();
        writeln!(file, "termination_delay_ms = 42").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.runloop.termination_delay_ms, 42);

        let config = ConfigLoader::load_or_default(Some(file.path())).unwrap();
        assert_eq!(config.runloop.termination_delay_ms, 42);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let path = Path::new("/nonexistent/path/config.toml");
        assert!(matches!(ConfigLoader::load(path), Err(ConfigError::NotFound(_))));
        assert!(ConfigLoader::load_or_default(Some(path)).is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let result = ConfigLoader::load_str("[runloop]\ntermination_delay_ms = \"soon\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: unique test-only variable
        unsafe {
            std::env::set_var("SCRIPTLOOP_TEST_DELAY", "1500");
        }
        let content = "[runloop]\ntermination_delay_ms = ${SCRIPTLOOP_TEST_DELAY}";
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.runloop.termination_delay_ms, 1500);
        unsafe {
            std::env::remove_var("SCRIPTLOOP_TEST_DELAY");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${NONEXISTENT_TEST_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(name)) if name == "NONEXISTENT_TEST_VAR_12345"));
    }

    #[test]
    fn test_expand_env_vars_no_vars() {
        let content = "value = \"no variables here\"";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert_eq!(expanded, content);
    }

    #[test]
    fn test_commented_env_var_ignored() {
        let content = "[daemon]\n  # pid_file = \"${NONEXISTENT_TEST_VAR_67890}\"\nsingle_instance = false\n";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert_eq!(expanded, content);

        let config = ConfigLoader::load_str(content).unwrap();
        assert!(!config.daemon.single_instance);
    }

    #[test]
    fn test_expand_path_no_tilde() {
        assert_eq!(ConfigLoader::expand_path("/usr/local/bin"), "/usr/local/bin");
    }
}
