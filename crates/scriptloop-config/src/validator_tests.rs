use super::*;
use std::path::PathBuf;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_zero_threads() {
    let mut config = Config::default();
    config.runloop.meta_threads = 0;
    config.runloop.max_work_threads = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "runloop.meta_threads"));
    assert!(result.errors.iter().any(|e| e.path == "runloop.max_work_threads"));
}

#[test]
fn test_validate_long_delay_warning() {
    let mut config = Config::default();
    config.runloop.termination_delay_ms = 2 * 3600 * 1000;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result
        .warnings
        .iter()
        .any(|w| w.path == "runloop.termination_delay_ms"));
}

#[test]
fn test_validate_empty_pid_file() {
    let mut config = Config::default();
    config.daemon.pid_file = PathBuf::new();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "daemon.pid_file"));

    config.daemon.single_instance = false;
    assert!(ConfigValidator::validate(&config).unwrap().is_valid());
}

#[test]
fn test_validate_signals_disabled_warning() {
    let mut config = Config::default();
    config.daemon.handle_signals = false;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].path, "daemon.handle_signals");
}

#[test]
fn test_validate_log_levels() {
    let mut config = Config::default();

    config.logging.level = "DEBUG".to_string();
    assert!(ConfigValidator::validate(&config).unwrap().warnings.is_empty());

    config.logging.level = "scriptloop_runloop=trace,info".to_string();
    assert!(ConfigValidator::validate(&config).unwrap().warnings.is_empty());

    config.logging.level = "verbose".to_string();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "logging.level"));

    config.logging.level = "  ".to_string();
    assert!(!ConfigValidator::validate(&config).unwrap().is_valid());
}

#[test]
fn test_validate_log_dir_is_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut config = Config::default();
    config.logging.dir = Some(file.path().to_path_buf());

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "logging.dir"));
}

#[test]
fn test_check_folds_first_error() {
    let mut config = Config::default();
    config.runloop.meta_threads = 0;

    match ConfigValidator::check(&config) {
        Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "runloop.meta_threads"),
        other => panic!("expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_check_returns_warnings() {
    let mut config = Config::default();
    config.daemon.handle_signals = false;
    let warnings = ConfigValidator::check(&config).unwrap();
    assert_eq!(warnings.len(), 1);
}

#[test]
fn test_validation_result_default() {
    let result = ValidationResult::default();
    assert!(result.is_valid());
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());
}
