//! One-shot cancellation flag with an inline transition handler.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

type Handler = Box<dyn FnOnce() + Send + 'static>;

/// Edge-triggered cancellation flag.
///
/// The flag goes from unset to set at most once. The registered handler, if
/// any, runs synchronously on the call that performs that transition and on no
/// other. Script routines poll [`is_cancelled`](Self::is_cancelled) or await
/// [`cancelled`](Self::cancelled) to exit early.
pub struct CancellationFlag {
    set: AtomicBool,
    token: CancellationToken,
    handler: Mutex<Option<Handler>>,
}

impl Default for CancellationFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self {
            set: AtomicBool::new(false),
            token: CancellationToken::new(),
            handler: Mutex::new(None),
        }
    }

    /// Set the flag. Returns true only for the call that performed the transition.
    ///
    /// The handler must be quick: it runs inline before this returns.
    pub fn cancel(&self) -> bool {
        if self
            .set
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        self.token.cancel();
        let handler = self.handler.lock().take();
        if let Some(handler) = handler {
            handler();
        }
        true
    }

    /// Non-blocking read of the flag.
    pub fn is_cancelled(&self) -> bool {
        self.set.load(Ordering::Acquire)
    }

    /// Resolve once the flag is set.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// A token cancelled together with this flag.
    ///
    /// Cancelling the returned token does not set the flag.
    pub fn token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Replace the transition handler.
    ///
    /// A handler installed after the flag is already set never runs.
    pub fn set_handler<F>(&self, handler: Option<F>)
    where
        F: FnOnce() + Send + 'static,
    {
        let handler = handler.map(|h| Box::new(h) as Handler);
        *self.handler.lock() = handler;
    }

    /// Whether a handler is waiting for the transition.
    pub fn has_handler(&self) -> bool {
        self.handler.lock().is_some()
    }
}

impl std::fmt::Debug for CancellationFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationFlag")
            .field("cancelled", &self.is_cancelled())
            .field("has_handler", &self.has_handler())
            .finish()
    }
}
