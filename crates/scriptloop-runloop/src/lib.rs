//! # scriptloop RunLoop
//!
//! Invocation coordinator for long-lived script hosts.
//!
//! A script's main routine runs once per trigger. The host process may only
//! exit when, for every trigger accepted so far:
//!
//! 1. the routine has returned,
//! 2. all async sub-work it registered has finished,
//! 3. the termination delay has elapsed since then.
//!
//! A new trigger arriving during the delay keeps the process alive for
//! another full cycle.
//!
//! ## Architecture
//!
//! ```text
//!  triggers (startup, signals, reactivation, trigger_main)
//!         │
//!         ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Coordinator                                                  │
//! │   index counter ── outer CompletionGroup ── CancellationFlag │
//! └──────┬───────────────────────────────────────────┬───────────┘
//!        │ main(coordinator, invocation)             │ notifications, timers
//!        ▼                                           ▼
//!   work context (blocking pool)             meta context (async workers)
//! ```
//!
//! ## Key Components
//!
//! - [`Coordinator`]: invocation dispatch and termination
//! - [`Script`]: the user's set_up / main / tear_down
//! - [`CompletionGroup`]: counted outstanding work with zero notifications
//! - [`Scheduler`]: the work and meta execution contexts
//! - [`CancellationFlag`]: one-shot termination signal
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use scriptloop_runloop::{Coordinator, Invocation, RunLoopConfig, Scheduler, Script};
//!
//! struct Hello;
//!
//! impl Script for Hello {
//!     type Context = String;
//!
//!     fn set_up(&self, coordinator: &Coordinator<Self>) {
//!         coordinator.set_termination_delay(Duration::from_secs(5));
//!     }
//!
//!     fn main(&self, _coordinator: &Coordinator<Self>, invocation: Invocation<String>) {
//!         println!("invocation {}", invocation.index());
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let scheduler = Scheduler::current().unwrap();
//!     let coordinator = Coordinator::new(Hello, scheduler, &RunLoopConfig::default());
//!     coordinator.start().unwrap();
//!     let reason = coordinator.wait_for_exit().await;
//!     println!("exited: {}", reason);
//! }
//! ```

pub mod cancel;
pub mod config;
pub mod coordinator;
mod coordinator_accessors;
mod coordinator_dispatch;
mod coordinator_termination;
pub mod error;
pub mod group;
pub mod metrics;
pub mod scheduler;
pub mod script;
pub mod state;

// Re-exports
pub use cancel::CancellationFlag;
pub use config::RunLoopConfig;
pub use coordinator::Coordinator;
pub use error::{CoordinatorError, CoordinatorResult};
pub use group::{CompletionGroup, GroupGuard};
pub use metrics::{CoordinatorMetrics, MetricsSnapshot};
pub use scheduler::{ContextKind, ExecutionContext, Scheduler, SchedulerRuntime};
pub use script::{Invocation, Script};
pub use state::{CoordinatorState, ExitReason};
// Re-export CancellationToken for convenience
pub use tokio_util::sync::CancellationToken;
