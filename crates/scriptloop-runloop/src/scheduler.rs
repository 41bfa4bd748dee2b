//! Dual scheduler: the work context and the meta context.
//!
//! Script routines may block for as long as they like, so they run on the
//! *work* context, which hands each closure to a blocking thread. Coordination
//! callbacks (group-empty notifications, termination delay timers, trigger
//! sources) run on the *meta* context, a set of async workers that a busy
//! routine can never stall.
//!
//! Both contexts accept any number of pending submissions, and no submission
//! waits on another: every delayed callback owns its own timer.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::RunLoopConfig;
use crate::error::{CoordinatorError, CoordinatorResult};

/// Which execution context a callback runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// Long-running, possibly blocking script work.
    Work,
    /// Short coordination callbacks.
    Meta,
}

impl std::fmt::Display for ContextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextKind::Work => write!(f, "work"),
            ContextKind::Meta => write!(f, "meta"),
        }
    }
}

/// A cheap, cloneable handle to one execution context.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    kind: ContextKind,
    handle: Handle,
}

impl ExecutionContext {
    /// Wrap a runtime handle as an execution context of the given kind.
    pub fn new(kind: ContextKind, handle: Handle) -> Self {
        Self { kind, handle }
    }

    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    /// The underlying runtime handle.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Run `f` on this context without blocking the caller.
    ///
    /// On the work context `f` gets a blocking thread; on the meta context it
    /// runs on an async worker and must return promptly.
    pub fn run<F, T>(&self, f: F) -> JoinHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        match self.kind {
            ContextKind::Work => self.handle.spawn_blocking(f),
            ContextKind::Meta => self.handle.spawn(async move { f() }),
        }
    }

    /// Run `f` on this context no earlier than `delay` from now.
    pub fn run_after<F>(&self, delay: Duration, f: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let kind = self.kind;
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            match kind {
                ContextKind::Meta => f(),
                ContextKind::Work => {
                    if let Err(e) = tokio::task::spawn_blocking(f).await {
                        if e.is_panic() {
                            std::panic::resume_unwind(e.into_panic());
                        }
                    }
                }
            }
        })
    }

    /// Spawn auxiliary async work on this context's runtime.
    pub fn spawn<Fut>(&self, future: Fut) -> JoinHandle<Fut::Output>
    where
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }
}

/// The pair of execution contexts a coordinator dispatches onto.
#[derive(Debug, Clone)]
pub struct Scheduler {
    work: ExecutionContext,
    meta: ExecutionContext,
}

impl Scheduler {
    /// Build a scheduler from two runtime handles.
    pub fn new(work: Handle, meta: Handle) -> Self {
        Self {
            work: ExecutionContext::new(ContextKind::Work, work),
            meta: ExecutionContext::new(ContextKind::Meta, meta),
        }
    }

    /// Point both contexts at the runtime the caller is running on.
    ///
    /// Work still lands on that runtime's blocking pool, so script routines
    /// never occupy the async workers the meta context uses.
    pub fn current() -> CoordinatorResult<Self> {
        let handle =
            Handle::try_current().map_err(|e| CoordinatorError::NoRuntime(e.to_string()))?;
        Ok(Self::new(handle.clone(), handle))
    }

    pub fn work(&self) -> &ExecutionContext {
        &self.work
    }

    pub fn meta(&self) -> &ExecutionContext {
        &self.meta
    }

    /// Run `f` on the work context.
    pub fn run_on_work_context<F, T>(&self, f: F) -> JoinHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.work.run(f)
    }

    /// Run `f` on the meta context.
    pub fn run_on_meta_context<F, T>(&self, f: F) -> JoinHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.meta.run(f)
    }

    /// Run `f` on the meta context no earlier than `delay` from now.
    pub fn run_on_meta_context_after<F>(&self, delay: Duration, f: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.meta.run_after(delay, f)
    }
}

/// Owned runtimes backing a [`Scheduler`] in a host process.
pub struct SchedulerRuntime {
    work: Runtime,
    meta: Runtime,
}

impl SchedulerRuntime {
    /// Build the work and meta runtimes described by `config`.
    pub fn build(config: &RunLoopConfig) -> CoordinatorResult<Self> {
        config.validate()?;

        let meta = Builder::new_multi_thread()
            .worker_threads(config.meta_threads)
            .thread_name("scriptloop-meta")
            .enable_all()
            .build()
            .map_err(|source| CoordinatorError::RuntimeBuild {
                context: ContextKind::Meta,
                source,
            })?;

        // Routines only ever use the blocking pool; one async worker is enough
        // for the runtime's own bookkeeping.
        let work = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(config.max_work_threads)
            .thread_name("scriptloop-work")
            .enable_all()
            .build()
            .map_err(|source| CoordinatorError::RuntimeBuild {
                context: ContextKind::Work,
                source,
            })?;

        debug!(
            meta_threads = config.meta_threads,
            max_work_threads = config.max_work_threads,
            "Scheduler runtimes built"
        );

        Ok(Self { work, meta })
    }

    /// A scheduler dispatching onto these runtimes.
    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(self.work.handle().clone(), self.meta.handle().clone())
    }

    /// Drive `future` to completion on the meta runtime, blocking the caller.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.meta.block_on(future)
    }

    /// Tear down both runtimes without waiting for in-flight routines.
    pub fn shutdown(self) {
        self.work.shutdown_background();
        self.meta.shutdown_background();
        debug!("Scheduler runtimes shut down");
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
