//! Completion groups.
//!
//! A [`CompletionGroup`] counts outstanding units of work. Every registered
//! observer fires exactly once, the next time the count drops back to zero.
//! Groups are reusable: once empty they can be entered again and new observers
//! wait for the next return to zero.
//!
//! ```rust,no_run
//! use scriptloop_runloop::{CompletionGroup, Scheduler};
//!
//! # async fn example() {
//! let scheduler = Scheduler::current().unwrap();
//! let group = CompletionGroup::new();
//!
//! let guard = group.enter_guard();
//! scheduler.meta().spawn(async move {
//!     // async sub-work
//!     drop(guard);
//! });
//!
//! group.notify(scheduler.meta(), || println!("all work done"));
//! group.wait().await;
//! # }
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::scheduler::ExecutionContext;

type Callback = Box<dyn FnOnce() + Send + 'static>;

/// An observer waiting for the group to empty.
enum Waiter {
    /// Callback scheduled on the context it was registered with.
    Scheduled {
        context: ExecutionContext,
        callback: Callback,
    },
    /// Async waiter from [`CompletionGroup::wait`].
    Wake(oneshot::Sender<()>),
}

impl Waiter {
    fn fire(self) {
        match self {
            Waiter::Scheduled { context, callback } => {
                context.run(callback);
            }
            Waiter::Wake(tx) => {
                let _ = tx.send(());
            }
        }
    }
}

#[derive(Default)]
struct GroupState {
    count: usize,
    waiters: Vec<Waiter>,
}

/// Counting synchronization primitive with a notification on zero.
///
/// Cloning yields another handle to the same group.
#[derive(Clone, Default)]
pub struct CompletionGroup {
    state: Arc<Mutex<GroupState>>,
}

impl CompletionGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one more unit of outstanding work.
    pub fn enter(&self) {
        self.state.lock().count += 1;
    }

    /// Enter only while other work is outstanding.
    ///
    /// Returns `false` and leaves the group untouched when it is empty, so
    /// observers that already fired are never followed by more work.
    pub fn try_enter(&self) -> bool {
        let mut state = self.state.lock();
        if state.count == 0 {
            return false;
        }
        state.count += 1;
        true
    }

    /// Mark one unit of work as finished.
    ///
    /// When the count reaches zero every registered observer is released.
    ///
    /// # Panics
    ///
    /// Panics if called more times than [`enter`](Self::enter). An unbalanced
    /// leave would fire observers while work is still outstanding.
    pub fn leave(&self) {
        let waiters = {
            let mut state = self.state.lock();
            let Some(count) = state.count.checked_sub(1) else {
                drop(state);
                panic!("CompletionGroup::leave called without a matching enter");
            };
            state.count = count;
            if count > 0 {
                return;
            }
            std::mem::take(&mut state.waiters)
        };

        for waiter in waiters {
            waiter.fire();
        }
    }

    /// Run `callback` on `context` the next time the group is empty.
    ///
    /// If the group is already empty the callback is scheduled immediately.
    pub fn notify<F>(&self, context: &ExecutionContext, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.state.lock();
        if state.count == 0 {
            drop(state);
            context.run(callback);
            return;
        }
        state.waiters.push(Waiter::Scheduled {
            context: context.clone(),
            callback: Box::new(callback),
        });
    }

    /// Resolve once the group is empty.
    pub async fn wait(&self) {
        let rx = {
            let mut state = self.state.lock();
            if state.count == 0 {
                return;
            }
            let (tx, rx) = oneshot::channel();
            state.waiters.push(Waiter::Wake(tx));
            rx
        };
        let _ = rx.await;
    }

    /// Enter the group and return a guard that leaves it on drop.
    pub fn enter_guard(&self) -> GroupGuard {
        self.enter();
        GroupGuard {
            group: self.clone(),
        }
    }

    /// Current outstanding count.
    pub fn count(&self) -> usize {
        self.state.lock().count
    }

    /// Whether no work is outstanding.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

impl std::fmt::Debug for CompletionGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CompletionGroup")
            .field("count", &state.count)
            .field("waiters", &state.waiters.len())
            .finish()
    }
}

/// Leaves its [`CompletionGroup`] when dropped.
#[must_use = "dropping the guard leaves the group immediately"]
#[derive(Debug)]
pub struct GroupGuard {
    group: CompletionGroup,
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        self.group.leave();
    }
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;
