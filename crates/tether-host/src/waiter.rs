//! Typed guest-side view of a poll handle.

use std::fmt;
use tether_core::{FromHost, Handle, PollState};
use tracing::warn;

use crate::bridge::Bridge;

/// Something waiting on a value from the host, or holding it already.
///
/// [`Waiter::try_get`] returns `Some` at most once. If the completed value
/// cannot be decoded, or the handle turns out not to be a poll handle, the
/// waiter moves to an error state and never yields.
pub struct Waiter<T> {
    inner: WaiterInner<T>,
}

enum WaiterInner<T> {
    /// The value has been taken
    Taken,
    /// The value is available without asking the host
    Available(T),
    /// Poll handle still owned by this waiter
    Waiting(Handle),
    Error(String),
}

impl<T: FromHost> Waiter<T> {
    /// Wait on a poll handle. The waiter releases it once it completes.
    pub fn new(poll: Handle) -> Self {
        Self {
            inner: WaiterInner::Waiting(poll),
        }
    }

    /// A waiter that already has its value
    pub fn immediate(value: T) -> Self {
        Self {
            inner: WaiterInner::Available(value),
        }
    }

    /// A waiter that will never return `Some`
    pub fn empty() -> Self {
        Self {
            inner: WaiterInner::Taken,
        }
    }

    /// Try and get the value.
    ///
    /// On success the poll handle and the result handle are released.
    pub fn try_get(&mut self, bridge: &mut Bridge) -> Option<T> {
        match self.inner {
            WaiterInner::Taken | WaiterInner::Error(_) => None,
            WaiterInner::Available(_) => {
                match std::mem::replace(&mut self.inner, WaiterInner::Taken) {
                    WaiterInner::Available(value) => Some(value),
                    _ => None,
                }
            }
            WaiterInner::Waiting(poll) => {
                match Self::read(bridge, poll) {
                    Ok(None) => None,
                    Ok(Some(value)) => {
                        self.inner = WaiterInner::Taken;
                        Some(value)
                    }
                    Err(oh_no) => {
                        warn!(target: "tether::waiter", poll, error = %oh_no, "waiter failed");
                        self.inner = WaiterInner::Error(oh_no);
                        None
                    }
                }
            }
        }
    }

    fn read(bridge: &mut Bridge, poll: Handle) -> Result<Option<T>, String> {
        let result = match bridge.poll(poll).map_err(|e| e.to_string())? {
            PollState::Waiting => return Ok(None),
            PollState::Ready(result) => result,
        };
        let value = bridge
            .handles()
            .get(result)
            .and_then(T::from_host)
            .map_err(|e| e.to_string())?;
        // both handles are ours once the value is out
        for h in [result, poll] {
            if let Err(oh_no) = bridge.release(h) {
                warn!(target: "tether::waiter", handle = h, error = %oh_no, "release failed");
            }
        }
        Ok(Some(value))
    }

    /// Whether the waiter will never yield again
    pub fn is_done(&self) -> bool {
        matches!(self.inner, WaiterInner::Taken | WaiterInner::Error(_))
    }

    /// The failure that stopped this waiter, if any
    pub fn error(&self) -> Option<&str> {
        match &self.inner {
            WaiterInner::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Waiter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            WaiterInner::Taken => write!(f, "Taken"),
            WaiterInner::Available(it) => write!(f, "Available({:?})", it),
            WaiterInner::Waiting(h) => write!(f, "Waiting({})", h),
            WaiterInner::Error(e) => write!(f, "Error({})", e),
        }
    }
}
