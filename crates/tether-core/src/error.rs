//! Bridge error types

use crate::handle::Handle;
use thiserror::Error;

/// Errors surfaced by bridge operations.
///
/// Lookup faults, type mismatches on primitive reads and asynchronous
/// rejections never show up here: they are recovered into representable
/// outcomes (`None`, a waiting poll state) by the operations themselves.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BridgeError {
    /// The handle was never issued or has already been released
    #[error("Invalid handle {0} (never issued or already released)")]
    InvalidHandle(Handle),

    /// A typed read found a value of the wrong shape
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// The host rejected an operation (assignment to a primitive, frozen
    /// object, `toString` on null, ...)
    #[error("Host fault: {0}")]
    HostFault(String),

    /// A guest `(offset, len)` pair reaches outside guest memory
    #[error("Guest memory access out of bounds: {len} bytes at offset {offset} (memory size {size})")]
    MemoryAccess { offset: u32, len: u32, size: usize },
}

impl BridgeError {
    /// Create a host fault
    pub fn host_fault(message: impl Into<String>) -> Self {
        Self::HostFault(message.into())
    }

    /// Create a type mismatch
    pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }
}

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
