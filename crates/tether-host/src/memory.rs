use std::borrow::Cow;
use tether_core::{BridgeError, BridgeResult};

/// Read-only view of the guest's linear memory.
///
/// The guest passes strings as `(offset, len)` pairs into this memory.
#[derive(Debug, Clone, Copy)]
pub struct GuestMemory<'a> {
    bytes: &'a [u8],
}

impl<'a> GuestMemory<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Bounds-checked byte range
    pub fn read_bytes(&self, offset: u32, len: u32) -> BridgeResult<&'a [u8]> {
        let start = offset as usize;
        start
            .checked_add(len as usize)
            .and_then(|end| self.bytes.get(start..end))
            .ok_or(BridgeError::MemoryAccess {
                offset,
                len,
                size: self.bytes.len(),
            })
    }

    /// Decode a byte range as UTF-8, replacing invalid sequences
    pub fn read_str(&self, offset: u32, len: u32) -> BridgeResult<Cow<'a, str>> {
        Ok(String::from_utf8_lossy(self.read_bytes(offset, len)?))
    }
}
