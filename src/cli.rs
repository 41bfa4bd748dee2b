//! CLI definitions for scriptloop.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// scriptloop CLI.
#[derive(Parser)]
#[command(name = "scriptloop")]
#[command(about = "Long-lived script host with quiescence-based shutdown")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.scriptloop/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// PID file path, overriding the configuration
    #[arg(long, global = true)]
    pub pid_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub(crate) enum Commands {
    /// Host the demo script in the foreground (default)
    Run {
        /// Termination delay in milliseconds, overriding the configuration
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Duration of each async sub-task in milliseconds
        #[arg(long, default_value_t = 500)]
        work_ms: u64,

        /// Async sub-tasks started per invocation
        #[arg(long, default_value_t = 2)]
        sub_tasks: usize,

        /// Start even if another instance is running
        #[arg(long)]
        no_single_instance: bool,
    },

    /// Trigger another invocation in the running instance
    Reactivate,

    /// Ask the running instance to terminate
    Stop {
        /// Seconds to wait for the process to exit
        #[arg(long, default_value_t = 5)]
        wait_secs: u64,
    },

    /// Show whether an instance is running
    Status,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run {
            delay_ms: None,
            work_ms: 500,
            sub_tasks: 2,
            no_single_instance: false,
        }
    }
}
