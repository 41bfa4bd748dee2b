//! scriptloop - long-lived script host
//!
//! Hosts a script whose main routine runs once per trigger and exits once
//! every invocation has finished and the termination delay has passed.

mod cli;
mod cmd_instance;
mod demo;
mod logging;

use std::time::Duration;

use clap::Parser;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;

use scriptloop_config::{Config, ConfigLoader, ConfigValidator};
use scriptloop_daemon::ScriptRunner;

use crate::cli::{Cli, Commands};
use crate::demo::DemoScript;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load_or_default(cli.config.as_deref())?;
    if let Some(pid_file) = cli.pid_file {
        config.daemon.pid_file = pid_file;
    }

    let log_guard = logging::init_logging(&config.logging)?;

    match cli.command.unwrap_or_default() {
        Commands::Run {
            delay_ms,
            work_ms,
            sub_tasks,
            no_single_instance,
        } => {
            if let Some(delay_ms) = delay_ms {
                config.runloop.termination_delay_ms = delay_ms;
            }
            if no_single_instance {
                config.daemon.single_instance = false;
            }
            run(config, Duration::from_millis(work_ms), sub_tasks, log_guard)
        }
        Commands::Reactivate => Ok(cmd_instance::instance_reactivate(&config.daemon.pid_file)?),
        Commands::Stop { wait_secs } => Ok(cmd_instance::instance_stop(
            &config.daemon.pid_file,
            Duration::from_secs(wait_secs),
        )?),
        Commands::Status => Ok(cmd_instance::instance_status(&config.daemon.pid_file)?),
    }
}

/// Host the demo script; exits the process once it terminates.
fn run(
    config: Config,
    work: Duration,
    sub_tasks: usize,
    log_guard: Option<WorkerGuard>,
) -> Result<(), Box<dyn std::error::Error>> {
    for warning in ConfigValidator::check(&config)? {
        warn!(path = %warning.path, "{}", warning.message);
    }

    let script = DemoScript::new(config.runloop.termination_delay(), work, sub_tasks);
    ScriptRunner::new(config.runloop, config.daemon).run_holding(script, log_guard)
}
