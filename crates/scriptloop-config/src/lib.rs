//! # scriptloop Config
//!
//! TOML configuration for scriptloop hosts.
//!
//! ```toml
//! [runloop]
//! termination_delay_ms = 5000
//!
//! [daemon]
//! pid_file = "~/.scriptloop/scriptloop.pid"
//!
//! [logging]
//! level = "debug"
//! ```

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
