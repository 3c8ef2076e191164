//! Host microtask queue.
//!
//! Promise reactions and scheduled host work run here. One call to
//! [`MicrotaskQueue::run_until_idle`] is one host scheduling tick:
//!
//! - FIFO: first queued, first executed
//! - jobs enqueued while draining run in the same tick
//! - every job gets the handle table, so continuations can register results

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

use crate::handle::HandleTable;

/// Microtask callback type
pub type Microtask = Box<dyn FnOnce(&mut HandleTable) + Send>;

/// Queue of pending host jobs
pub struct MicrotaskQueue {
    queue: Mutex<VecDeque<Microtask>>,
}

impl MicrotaskQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Add a microtask to the queue
    pub fn enqueue<F>(&self, task: F)
    where
        F: FnOnce(&mut HandleTable) + Send + 'static,
    {
        self.queue.lock().push_back(Box::new(task));
    }

    /// Take the next microtask
    pub fn dequeue(&self) -> Option<Microtask> {
        self.queue.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Drop all pending microtasks without running them
    pub fn clear(&self) {
        self.queue.lock().clear();
    }

    /// Run jobs until the queue is empty. Returns how many ran.
    pub fn run_until_idle(&self, table: &mut HandleTable) -> usize {
        let mut ran = 0;
        // the lock is released before each job runs, so jobs may enqueue
        while let Some(task) = self.dequeue() {
            task(table);
            ran += 1;
        }
        if ran > 0 {
            debug!(target: "tether::microtask", ran, "drained microtask queue");
        }
        ran
    }
}

impl Default for MicrotaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MicrotaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MicrotaskQueue")
            .field("pending", &self.len())
            .finish()
    }
}
