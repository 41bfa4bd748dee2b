//! The user-supplied script and the per-invocation value it receives.

use crate::coordinator::Coordinator;
use crate::group::CompletionGroup;

/// A unit of work the coordinator invokes once per trigger.
///
/// Exactly one instance lives per coordinator. The coordinator calls
/// [`set_up`](Script::set_up) once before the first invocation,
/// [`main`](Script::main) once per trigger (possibly on several threads at the
/// same time), and [`tear_down`](Script::tear_down) once before releasing the
/// script.
pub trait Script: Send + Sync + Sized + 'static {
    /// Payload a trigger can hand to `main`.
    type Context: Send + 'static;

    /// Configure the coordinator: termination delay, cancellation handler,
    /// extra trigger sources. Runs synchronously and should be quick.
    fn set_up(&self, _coordinator: &Coordinator<Self>) {}

    /// The script's main routine. May block for as long as it needs.
    ///
    /// Async sub-work that must finish before the invocation counts as done is
    /// tracked through [`Invocation::group`].
    fn main(&self, coordinator: &Coordinator<Self>, invocation: Invocation<Self::Context>);

    /// Release external resources before the process exits.
    fn tear_down(&self, _coordinator: &Coordinator<Self>) {}
}

/// One run of a script's main routine.
#[derive(Debug)]
pub struct Invocation<C> {
    index: u64,
    group: CompletionGroup,
    context: Option<C>,
}

impl<C> Invocation<C> {
    pub(crate) fn new(index: u64, group: CompletionGroup, context: Option<C>) -> Self {
        Self {
            index,
            group,
            context,
        }
    }

    /// Position of this invocation in trigger order, starting at 0.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Group tracking this invocation's async sub-work.
    ///
    /// It starts empty; the invocation is done once `main` has returned and
    /// the group is empty again.
    pub fn group(&self) -> &CompletionGroup {
        &self.group
    }

    /// Payload supplied by the trigger, if any.
    pub fn context(&self) -> Option<&C> {
        self.context.as_ref()
    }

    /// Take ownership of the payload.
    pub fn take_context(&mut self) -> Option<C> {
        self.context.take()
    }

    /// Whether this is the first invocation of the process.
    pub fn is_initial(&self) -> bool {
        self.index == 0
    }
}
