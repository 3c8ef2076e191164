//! # Handle table
//!
//! The guest cannot hold host objects directly. Every host value it works
//! with lives in a [`HandleTable`] and is referred to by a small integer
//! [`Handle`].
//!
//! ```
//! use tether_core::{HandleTable, HostValue};
//!
//! let mut table = HandleTable::new();
//! let h = table.register(HostValue::string("hello"));
//! assert_eq!(table.resolve(h).unwrap().as_str(), Some("hello"));
//!
//! table.release(h).unwrap();
//! assert!(table.resolve(h).is_err());
//! ```
//!
//! Several handles may alias the same host object; releasing one of them
//! never affects the others.

use rustc_hash::FxHashMap;
use std::fmt;
use tracing::trace;

use crate::error::{BridgeError, BridgeResult};
use crate::value::HostValue;

/// Opaque identifier for a registered host value.
///
/// `0` is never issued, so a zeroed guest word is always an invalid handle.
pub type Handle = u32;

/// Owned mapping from live handles to host values.
pub struct HandleTable {
    slots: FxHashMap<Handle, HostValue>,
    /// Next candidate id. Starts at 1.
    next: Handle,
}

impl HandleTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            slots: FxHashMap::default(),
            next: 1,
        }
    }

    /// Store a value and return a handle that is not currently live.
    ///
    /// Any value may be registered, including `null` and objects that are
    /// already registered under another handle.
    pub fn register(&mut self, value: HostValue) -> Handle {
        let handle = self.next_free();
        trace!(target: "tether::handle", handle, kind = value.kind_name(), "register");
        self.slots.insert(handle, value);
        handle
    }

    fn next_free(&mut self) -> Handle {
        loop {
            let candidate = self.next;
            self.next = match self.next.wrapping_add(1) {
                0 => 1,
                n => n,
            };
            if !self.slots.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    /// Resolve a handle to its value.
    ///
    /// Reference types are shared, so the returned value observes later
    /// mutations made through any handle.
    pub fn resolve(&self, handle: Handle) -> BridgeResult<HostValue> {
        self.get(handle).cloned()
    }

    /// Borrow the value behind a handle
    pub fn get(&self, handle: Handle) -> BridgeResult<&HostValue> {
        self.slots
            .get(&handle)
            .ok_or(BridgeError::InvalidHandle(handle))
    }

    /// Invalidate `handle` and hand back the value it held.
    pub fn release(&mut self, handle: Handle) -> BridgeResult<HostValue> {
        let value = self
            .slots
            .remove(&handle)
            .ok_or(BridgeError::InvalidHandle(handle))?;
        trace!(target: "tether::handle", handle, "release");
        Ok(value)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.slots.contains_key(&handle)
    }

    /// Number of live handles
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Release every handle. Objects stay alive while other owners hold them.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleTable")
            .field("live", &self.slots.len())
            .field("next", &self.next)
            .finish()
    }
}
