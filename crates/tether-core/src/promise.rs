//! Host promises
//!
//! A [`HostPromise`] settles at most once. Reactions registered with
//! [`HostPromise::then`] never run synchronously: when the promise settles
//! (or right away, if it already has) they are scheduled on the promise's
//! [`MicrotaskQueue`] and run on the next tick.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use crate::handle::HandleTable;
use crate::microtask::MicrotaskQueue;
use crate::value::HostValue;

/// Promise state
#[derive(Debug, Clone)]
pub enum PromiseState {
    /// Not yet settled
    Pending,
    /// Resolved with value
    Fulfilled(HostValue),
    /// Rejected with reason
    Rejected(HostValue),
}

impl PromiseState {
    pub fn is_pending(&self) -> bool {
        matches!(self, PromiseState::Pending)
    }
}

/// Reaction callback type
pub type Reaction = Box<dyn FnOnce(&mut HandleTable, HostValue) + Send>;

struct PromiseInner {
    state: PromiseState,
    reactions: Vec<(Reaction, Reaction)>,
}

/// A host promise
#[derive(Clone)]
pub struct HostPromise {
    inner: Arc<Mutex<PromiseInner>>,
    queue: Arc<MicrotaskQueue>,
}

impl HostPromise {
    /// Create a new pending promise whose reactions run on `queue`
    pub fn new(queue: Arc<MicrotaskQueue>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PromiseInner {
                state: PromiseState::Pending,
                reactions: Vec::new(),
            })),
            queue,
        }
    }

    /// Create an already fulfilled promise
    pub fn resolved(queue: Arc<MicrotaskQueue>, value: HostValue) -> Self {
        let promise = Self::new(queue);
        promise.resolve(value);
        promise
    }

    /// Create an already rejected promise
    pub fn rejected(queue: Arc<MicrotaskQueue>, reason: HostValue) -> Self {
        let promise = Self::new(queue);
        promise.reject(reason);
        promise
    }

    /// Fulfil the promise. Returns `false` if it had already settled.
    pub fn resolve(&self, value: HostValue) -> bool {
        self.settle(PromiseState::Fulfilled(value))
    }

    /// Reject the promise. Returns `false` if it had already settled.
    pub fn reject(&self, reason: HostValue) -> bool {
        self.settle(PromiseState::Rejected(reason))
    }

    fn settle(&self, outcome: PromiseState) -> bool {
        let reactions = {
            let mut inner = self.inner.lock();
            if !inner.state.is_pending() {
                return false;
            }
            inner.state = outcome.clone();
            std::mem::take(&mut inner.reactions)
        };
        for (on_fulfilled, on_rejected) in reactions {
            self.schedule(&outcome, on_fulfilled, on_rejected);
        }
        true
    }

    /// Register reactions for fulfilment and rejection
    pub fn then<F, R>(&self, on_fulfilled: F, on_rejected: R)
    where
        F: FnOnce(&mut HandleTable, HostValue) + Send + 'static,
        R: FnOnce(&mut HandleTable, HostValue) + Send + 'static,
    {
        let on_fulfilled: Reaction = Box::new(on_fulfilled);
        let on_rejected: Reaction = Box::new(on_rejected);

        let state = {
            let mut inner = self.inner.lock();
            if inner.state.is_pending() {
                inner.reactions.push((on_fulfilled, on_rejected));
                return;
            }
            inner.state.clone()
        };
        self.schedule(&state, on_fulfilled, on_rejected);
    }

    fn schedule(&self, outcome: &PromiseState, on_fulfilled: Reaction, on_rejected: Reaction) {
        match outcome.clone() {
            PromiseState::Fulfilled(value) => {
                self.queue.enqueue(move |table| on_fulfilled(table, value))
            }
            PromiseState::Rejected(reason) => {
                self.queue.enqueue(move |table| on_rejected(table, reason))
            }
            PromiseState::Pending => {}
        }
    }

    /// Get current state
    pub fn state(&self) -> PromiseState {
        self.inner.lock().state.clone()
    }

    /// Queue the reactions run on
    pub fn queue(&self) -> &Arc<MicrotaskQueue> {
        &self.queue
    }

    pub fn ptr_eq(&self, other: &HostPromise) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for HostPromise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.inner.lock().state {
            PromiseState::Pending => "pending",
            PromiseState::Fulfilled(_) => "fulfilled",
            PromiseState::Rejected(_) => "rejected",
        };
        f.write_str(label)
    }
}
