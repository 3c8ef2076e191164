//! The guest-facing boundary.
//!
//! A [`Bridge`] owns one handle table, the host microtask queue and the
//! host services. Every function the guest can import is a method here;
//! handles cross the boundary as plain `u32`s.

use paste::paste;
use std::sync::Arc;
use tether_core::marshal::HostPrimitive;
use tether_core::{
    BridgeResult, Handle, HandleTable, HostValue, MicrotaskQueue, PollState, PrimitiveKind,
    ServiceObject, encode_optional, ops, poll, primitive_from_host,
};
use tether_kv::{KvResult, Location, MemoryStorage, StorageBackend};
use tracing::debug;

use crate::clipboard::{self, ClipboardBackend, MemoryClipboard};
use crate::config::BridgeConfig;
use crate::console::{ConsoleLevel, ConsoleSink};
use crate::memory::GuestMemory;
use crate::storage;

macro_rules! primitive_boundary {
    ($($ty:ident),* $(,)?) => {
        paste! {
            $(
                #[doc = concat!("Register a `", stringify!($ty), "` as a host value")]
                pub fn [<primitive_to_host_ $ty>](&mut self, value: $ty) -> Handle {
                    self.table.register(value.to_host_value())
                }

                #[doc = concat!("Read `h` as a `", stringify!($ty), "`; `None` on a host type mismatch")]
                pub fn [<primitive_from_host_ $ty>](&self, h: Handle) -> BridgeResult<Option<$ty>> {
                    Ok(<$ty>::read_host(self.table.get(h)?))
                }
            )*
        }
    };
}

/// One guest/host session
pub struct Bridge {
    table: HandleTable,
    queue: Arc<MicrotaskQueue>,
    storage: Arc<dyn StorageBackend>,
    clipboard: Arc<dyn ClipboardBackend>,
    console: ConsoleSink,
    location: Location,
}

impl Bridge {
    /// Bridge with in-memory services and the tracing console
    pub fn new() -> Self {
        Self::with_services(
            Arc::new(MemoryStorage::new()),
            Arc::new(MemoryClipboard::default()),
        )
    }

    pub fn with_services(
        storage: Arc<dyn StorageBackend>,
        clipboard: Arc<dyn ClipboardBackend>,
    ) -> Self {
        Self {
            table: HandleTable::new(),
            queue: Arc::new(MicrotaskQueue::new()),
            storage,
            clipboard,
            console: ConsoleSink::tracing(),
            location: Location::default(),
        }
    }

    /// Open the services described by `config`
    pub fn from_config(config: &BridgeConfig) -> KvResult<Self> {
        let storage = config.storage.open(&config.location)?;
        debug!(target: "tether::bridge", storage = storage.name(), "bridge configured");
        Ok(Self::with_services(storage, config.clipboard.open())
            .with_location(config.location.clone()))
    }

    pub fn with_console(mut self, console: ConsoleSink) -> Self {
        self.console = console;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    // --- object primitives ---

    /// Register host `null`
    pub fn null(&mut self) -> Handle {
        ops::null_handle(&mut self.table)
    }

    /// Register the `typeof` string of `h`
    pub fn type_of(&mut self, h: Handle) -> BridgeResult<Handle> {
        ops::type_of(&mut self.table, h)
    }

    /// `obj[key] = val`
    pub fn set_field_any(&mut self, obj: Handle, key: Handle, val: Handle) -> BridgeResult<()> {
        ops::set_field(&mut self.table, obj, key, val)
    }

    /// Register `h.toString()`
    pub fn as_string(&mut self, h: Handle) -> BridgeResult<Handle> {
        ops::as_string(&mut self.table, h)
    }

    /// Register a fresh empty array
    pub fn array(&mut self) -> Handle {
        ops::new_array(&mut self.table)
    }

    /// Register a fresh empty record
    pub fn object(&mut self) -> Handle {
        ops::new_object(&mut self.table)
    }

    /// Register the long option of `obj[key]`
    pub fn try_get_field(&mut self, obj: Handle, key: Handle) -> BridgeResult<Handle> {
        ops::try_get_field(&mut self.table, obj, key)
    }

    /// Decode a long-option handle
    pub fn unwrap_optional(&mut self, h: Handle) -> BridgeResult<Option<Handle>> {
        ops::unwrap_optional(&mut self.table, h)
    }

    pub fn equals(&self, a: Handle, b: Handle, strict: bool) -> BridgeResult<bool> {
        ops::equals(&self.table, a, b, strict)
    }

    /// `obj[name] !== undefined`, with `name` read from guest memory
    pub fn has_field(
        &self,
        obj: Handle,
        memory: &GuestMemory<'_>,
        offset: u32,
        len: u32,
    ) -> BridgeResult<bool> {
        let name = memory.read_str(offset, len)?;
        ops::has_field(&self.table, obj, &name)
    }

    /// [`Bridge::has_field`] for callers that already hold the name
    pub fn has_field_named(&self, obj: Handle, name: &str) -> BridgeResult<bool> {
        ops::has_field(&self.table, obj, name)
    }

    pub fn truthy(&self, h: Handle) -> BridgeResult<bool> {
        ops::truthy(&self.table, h)
    }

    pub fn is_null(&self, h: Handle) -> BridgeResult<bool> {
        ops::is_null(&self.table, h)
    }

    pub fn freeze(&self, h: Handle) -> BridgeResult<()> {
        ops::freeze(&self.table, h)
    }

    // --- primitive marshaling ---

    primitive_boundary!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64, bool);

    /// Read `h` as `kind` and register the long-option encoding of the result
    pub fn primitive_from_host_encoded(
        &mut self,
        kind: PrimitiveKind,
        h: Handle,
    ) -> BridgeResult<Handle> {
        let value = primitive_from_host(kind, self.table.get(h)?)
            .map(|p| (kind.entry().to_host)(p));
        Ok(self.table.register(encode_optional(value)))
    }

    // --- services ---

    /// Save `String(val)` under `String(key)`
    pub fn storage_save(&mut self, key: Handle, val: Handle) -> BridgeResult<Result<(), String>> {
        storage::storage_save(&self.table, self.storage.as_ref(), key, val)
    }

    /// Load the string stored under `String(key)`
    pub fn storage_load(&mut self, key: Handle) -> BridgeResult<Result<Handle, String>> {
        storage::storage_load(&mut self.table, self.storage.as_ref(), key)
    }

    /// Poll handle completing with the clipboard text
    pub fn clipboard_get(&mut self) -> Handle {
        clipboard::clipboard_get(&mut self.table, &self.queue, self.clipboard.clone())
    }

    /// Poll handle completing once `String(text)` is on the clipboard
    pub fn clipboard_set(&mut self, text: Handle) -> BridgeResult<Handle> {
        clipboard::clipboard_set(&mut self.table, &self.queue, self.clipboard.clone(), text)
    }

    pub fn console_log(&self, h: Handle) -> BridgeResult<()> {
        self.console.log(ConsoleLevel::Log, self.table.get(h)?);
        Ok(())
    }

    /// Register the storage service itself as an opaque host object
    pub fn storage_object(&mut self) -> Handle {
        let service = ServiceObject::new("Storage", self.storage.clone());
        self.table.register(HostValue::Service(service))
    }

    /// Register the clipboard service itself as an opaque host object
    pub fn clipboard_object(&mut self) -> Handle {
        let service = ServiceObject::new("Clipboard", self.clipboard.clone());
        self.table.register(HostValue::Service(service))
    }

    // --- session ---

    /// One host scheduling tick. Returns the number of jobs run.
    pub fn tick(&mut self) -> usize {
        self.queue.run_until_idle(&mut self.table)
    }

    /// Read a poll handle
    pub fn poll(&self, h: Handle) -> BridgeResult<PollState<Handle>> {
        poll::check(&self.table, h)
    }

    pub fn release(&mut self, h: Handle) -> BridgeResult<HostValue> {
        self.table.release(h)
    }

    /// Register a host string
    pub fn string(&mut self, text: &str) -> Handle {
        ops::string(&mut self.table, text)
    }

    /// Read `h` as a string; `None` if it holds anything else
    pub fn read_string(&self, h: Handle) -> BridgeResult<Option<String>> {
        ops::read_string(&self.table, h)
    }

    /// Register any host value
    pub fn register(&mut self, value: HostValue) -> Handle {
        self.table.register(value)
    }

    pub fn handles(&self) -> &HandleTable {
        &self.table
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn storage(&self) -> &Arc<dyn StorageBackend> {
        &self.storage
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("handles", &self.table)
            .field("queue", &self.queue)
            .field("storage", &self.storage.name())
            .field("location", &self.location.key())
            .finish()
    }
}
