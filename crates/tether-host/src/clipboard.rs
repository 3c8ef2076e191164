//! Clipboard service
//!
//! The host clipboard is asynchronous: both operations return a poll
//! handle right away and the backend call runs on the next tick.

use parking_lot::Mutex;
use std::sync::Arc;
use tether_core::{BridgeResult, Handle, HandleTable, HostPromise, HostValue, MicrotaskQueue, begin_async};
use tracing::debug;

/// A clipboard the host can read and write text through
pub trait ClipboardBackend: Send + Sync {
    fn read_text(&self) -> Result<String, String>;

    fn write_text(&self, text: &str) -> Result<(), String>;
}

/// Clipboard held in process memory
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    text: Mutex<String>,
}

impl MemoryClipboard {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(initial.into()),
        }
    }

    /// Current clipboard text
    pub fn contents(&self) -> String {
        self.text.lock().clone()
    }
}

impl ClipboardBackend for MemoryClipboard {
    fn read_text(&self) -> Result<String, String> {
        Ok(self.text.lock().clone())
    }

    fn write_text(&self, text: &str) -> Result<(), String> {
        *self.text.lock() = text.to_string();
        Ok(())
    }
}

/// Clipboard the user never granted access to; every call rejects.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeniedClipboard;

impl ClipboardBackend for DeniedClipboard {
    fn read_text(&self) -> Result<String, String> {
        Err("NotAllowedError: Read permission denied.".to_string())
    }

    fn write_text(&self, _text: &str) -> Result<(), String> {
        Err("NotAllowedError: Write permission denied.".to_string())
    }
}

/// Read the clipboard. The poll handle completes with a string.
pub fn clipboard_get(
    table: &mut HandleTable,
    queue: &Arc<MicrotaskQueue>,
    backend: Arc<dyn ClipboardBackend>,
) -> Handle {
    let promise = HostPromise::new(queue.clone());
    let settle = promise.clone();
    queue.enqueue(move |_| {
        debug!(target: "tether::clipboard", "read");
        match backend.read_text() {
            Ok(text) => settle.resolve(HostValue::from(text)),
            Err(reason) => settle.reject(HostValue::from(reason)),
        };
    });
    begin_async(table, &promise)
}

/// Write `text` (coerced with host string rules) to the clipboard. The poll
/// handle completes with `undefined`.
pub fn clipboard_set(
    table: &mut HandleTable,
    queue: &Arc<MicrotaskQueue>,
    backend: Arc<dyn ClipboardBackend>,
    text: Handle,
) -> BridgeResult<Handle> {
    let text = table.get(text)?.to_js_string();
    let promise = HostPromise::new(queue.clone());
    let settle = promise.clone();
    queue.enqueue(move |_| {
        debug!(target: "tether::clipboard", len = text.len(), "write");
        match backend.write_text(&text) {
            Ok(()) => settle.resolve(HostValue::Undefined),
            Err(reason) => settle.reject(HostValue::from(reason)),
        };
    });
    Ok(begin_async(table, &promise))
}
