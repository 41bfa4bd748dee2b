//! # scriptloop Daemon
//!
//! Process hosting for scriptloop scripts.
//!
//! ## Features
//!
//! - PID file management (one instance per PID file)
//! - Single-instance reactivation: a second launch triggers the running instance
//! - Signal handling (SIGTERM/SIGINT terminate, SIGUSR1/SIGHUP reactivate)
//! - Dedicated work and meta runtimes per hosted script
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scriptloop_daemon::{DaemonConfig, ScriptRunner};
//! use scriptloop_runloop::RunLoopConfig;
//!
//! let runner = ScriptRunner::new(RunLoopConfig::default(), DaemonConfig::default());
//! let outcome = runner.try_run(MyScript::new())?;
//! std::process::exit(outcome.exit_code());
//! ```

pub mod config;
pub mod error;
pub mod pid;
pub mod runner;
pub mod signal;

// Re-exports
pub use config::DaemonConfig;
pub use error::DaemonError;
pub use pid::PidFile;
pub use runner::{running_instance, signal_running_instance, RunOutcome, ScriptRunner};
pub use signal::{send_signal_to_pid, DaemonSignal, SignalBridge};
