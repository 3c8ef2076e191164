//! Promise-to-poll adaptation.
//!
//! The guest cannot suspend, so it cannot await a host promise. Instead
//! [`begin_async`] hands back a handle to a [`PollCell`] straight away and the
//! guest re-reads it with [`check`] after each host tick:
//!
//! ```text
//!   begin_async ──> Waiting ──(promise fulfilled, next tick)──> Ready(handle)
//!                      │
//!                      └──(promise rejected)──> logged, stays Waiting
//! ```
//!
//! A rejected operation is never reported to the guest; its poll state
//! stays `Waiting` forever.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{trace, warn};

use crate::error::{BridgeError, BridgeResult};
use crate::handle::{Handle, HandleTable};
use crate::promise::HostPromise;
use crate::value::HostValue;

/// Result of reading a poll handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState<T> {
    Waiting,
    Ready(T),
}

impl<T> PollState<T> {
    pub fn is_waiting(&self) -> bool {
        matches!(self, PollState::Waiting)
    }

    /// The completed value, if any
    pub fn ready(self) -> Option<T> {
        match self {
            PollState::Ready(value) => Some(value),
            PollState::Waiting => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PollState<U> {
        match self {
            PollState::Ready(value) => PollState::Ready(f(value)),
            PollState::Waiting => PollState::Waiting,
        }
    }
}

enum Slot {
    Waiting,
    Ready { handle: Handle, value: HostValue },
}

/// Mutable host cell behind a poll handle.
///
/// Generic field access sees `{ waiting: true }` until completion and
/// `{ waiting: false, value }` afterwards.
#[derive(Clone)]
pub struct PollCell(Arc<Mutex<Slot>>);

impl PollCell {
    /// Create a cell in the waiting state
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(Slot::Waiting)))
    }

    /// Current state, as the handle of the result
    pub fn state(&self) -> PollState<Handle> {
        match &*self.0.lock() {
            Slot::Waiting => PollState::Waiting,
            Slot::Ready { handle, .. } => PollState::Ready(*handle),
        }
    }

    /// The result value once ready
    pub fn value(&self) -> Option<HostValue> {
        match &*self.0.lock() {
            Slot::Waiting => None,
            Slot::Ready { value, .. } => Some(value.clone()),
        }
    }

    /// Move to `Ready`. Returns `false` if the cell already completed.
    pub fn complete(&self, handle: Handle, value: HostValue) -> bool {
        let mut slot = self.0.lock();
        if matches!(*slot, Slot::Ready { .. }) {
            return false;
        }
        *slot = Slot::Ready { handle, value };
        true
    }

    pub fn ptr_eq(&self, other: &PollCell) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for PollCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Start observing `promise` and return a poll handle for it.
///
/// The handle is live immediately and reads as waiting. Once the promise
/// is fulfilled and the host has ticked, the result is registered under a
/// fresh handle and the cell points at it.
pub fn begin_async(table: &mut HandleTable, promise: &HostPromise) -> Handle {
    let cell = PollCell::new();
    let handle = table.register(HostValue::Poll(cell.clone()));
    trace!(target: "tether::poll", handle, "begin_async");

    promise.then(
        move |table, value| {
            let result = table.register(value.clone());
            cell.complete(result, value);
            trace!(target: "tether::poll", handle, result, "async operation completed");
        },
        move |_, reason| {
            warn!(
                target: "tether::poll",
                handle,
                reason = %reason.to_js_string(),
                "async operation rejected, poll state stays waiting"
            );
        },
    );
    handle
}

/// Typed read of a poll handle
pub fn check(table: &HandleTable, handle: Handle) -> BridgeResult<PollState<Handle>> {
    match table.get(handle)? {
        HostValue::Poll(cell) => Ok(cell.state()),
        other => Err(BridgeError::type_mismatch("poll state", other.kind_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::microtask::MicrotaskQueue;

    fn setup() -> (HandleTable, Arc<MicrotaskQueue>) {
        (HandleTable::new(), Arc::new(MicrotaskQueue::new()))
    }

    #[test]
    fn test_waiting_until_tick() {
        let (mut table, queue) = setup();
        let promise = HostPromise::new(queue.clone());

        let h = begin_async(&mut table, &promise);
        assert_eq!(check(&table, h).unwrap(), PollState::Waiting);

        promise.resolve(HostValue::string("done"));
        assert_eq!(check(&table, h).unwrap(), PollState::Waiting);

        queue.run_until_idle(&mut table);
        let result = check(&table, h).unwrap().ready().unwrap();
        assert_eq!(table.resolve(result).unwrap().as_str(), Some("done"));

        // repeated reads are stable
        assert_eq!(check(&table, h).unwrap(), PollState::Ready(result));
    }

    #[test]
    fn test_generic_field_view() {
        let (mut table, queue) = setup();
        let promise = HostPromise::new(queue.clone());
        let h = begin_async(&mut table, &promise);

        let cell = table.resolve(h).unwrap();
        assert_eq!(cell.get_property("waiting").unwrap().as_bool(), Some(true));
        assert!(cell.get_property("value").unwrap().is_undefined());

        promise.resolve(HostValue::Number(7.0));
        queue.run_until_idle(&mut table);
        assert_eq!(cell.get_property("waiting").unwrap().as_bool(), Some(false));
        assert_eq!(cell.get_property("value").unwrap().as_number(), Some(7.0));
    }

    #[test]
    fn test_rejected_operation_stays_waiting_forever() {
        let (mut table, queue) = setup();
        let promise = HostPromise::new(queue.clone());
        let h = begin_async(&mut table, &promise);

        promise.reject(HostValue::string("denied"));
        for _ in 0..3 {
            queue.run_until_idle(&mut table);
            assert_eq!(check(&table, h).unwrap(), PollState::Waiting);
        }
        // only the poll cell itself is registered
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_check_rejects_non_poll() {
        let (mut table, _) = setup();
        let h = table.register(HostValue::Null);

        assert!(matches!(
            check(&table, h),
            Err(BridgeError::TypeMismatch { .. })
        ));
        assert_eq!(check(&table, 99), Err(BridgeError::InvalidHandle(99)));
    }

    #[test]
    fn test_cell_completes_once() {
        let cell = PollCell::new();
        assert!(cell.complete(1, HostValue::Null));
        assert!(!cell.complete(2, HostValue::Null));
        assert_eq!(cell.state(), PollState::Ready(1));
    }
}
