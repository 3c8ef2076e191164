//! # Tether Host
//!
//! Host services and the boundary surface a guest imports.
//!
//! ```
//! use tether_host::Bridge;
//!
//! let mut bridge = Bridge::new();
//! let key = bridge.string("token");
//! let val = bridge.string("abc123");
//! bridge.storage_save(key, val).unwrap().unwrap();
//!
//! let loaded = bridge.storage_load(key).unwrap().unwrap();
//! assert_eq!(bridge.read_string(loaded).unwrap().as_deref(), Some("abc123"));
//! ```

pub mod bridge;
pub mod clipboard;
pub mod config;
pub mod console;
pub mod memory;
pub mod storage;
pub mod waiter;

pub use bridge::Bridge;
pub use clipboard::{ClipboardBackend, DeniedClipboard, MemoryClipboard};
pub use config::{BridgeConfig, ClipboardMode, StorageConfig};
pub use console::{ConsoleLevel, ConsoleSink};
pub use memory::GuestMemory;
pub use storage::{load_data, save_data};
pub use waiter::Waiter;
