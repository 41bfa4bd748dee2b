//! Configuration validation.

use std::time::Duration;

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

const KNOWN_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_runloop(config, &mut result);
        Self::validate_daemon(config, &mut result);
        Self::validate_logging(config, &mut result);

        Ok(result)
    }

    /// Validate and fold the first error into a [`ConfigError`].
    pub fn check(config: &Config) -> Result<Vec<ValidationWarning>, ConfigError> {
        let result = Self::validate(config)?;
        match result.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(result.warnings),
        }
    }

    fn validate_runloop(config: &Config, result: &mut ValidationResult) {
        if config.runloop.meta_threads == 0 {
            result.add_error(ValidationError::new(
                "runloop.meta_threads",
                "meta_threads must be greater than 0",
            ));
        }

        if config.runloop.max_work_threads == 0 {
            result.add_error(ValidationError::new(
                "runloop.max_work_threads",
                "max_work_threads must be greater than 0",
            ));
        }

        if config.runloop.termination_delay() > Duration::from_secs(3600) {
            result.add_warning(ValidationWarning::new(
                "runloop.termination_delay_ms",
                "termination delay is over an hour; idle processes will linger",
            ));
        }
    }

    fn validate_daemon(config: &Config, result: &mut ValidationResult) {
        if config.daemon.single_instance && config.daemon.pid_file.as_os_str().is_empty() {
            result.add_error(ValidationError::new(
                "daemon.pid_file",
                "pid_file cannot be empty when single_instance is enabled",
            ));
        }

        // Forwarded reactivations arrive as SIGUSR1.
        if config.daemon.single_instance && !config.daemon.handle_signals {
            result.add_warning(ValidationWarning::new(
                "daemon.handle_signals",
                "signals are ignored, so a second launch cannot reactivate this instance",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let level = config.logging.level.trim();
        if level.is_empty() {
            result.add_error(ValidationError::new(
                "logging.level",
                "Log level cannot be empty",
            ));
        } else if !level.contains(['=', ','])
            && !KNOWN_LEVELS.contains(&level.to_ascii_lowercase().as_str())
        {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                format!(
                    "Unknown log level '{}', valid values: {:?}",
                    level, KNOWN_LEVELS
                ),
            ));
        }

        if let Some(dir) = &config.logging.dir {
            if dir.exists() && !dir.is_dir() {
                result.add_error(ValidationError::new(
                    "logging.dir",
                    format!("Log path is not a directory: {:?}", dir),
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
