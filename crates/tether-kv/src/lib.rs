//! Tether KV - string storage backends for the Tether bridge
//!
//! The storage adapter of the bridge behaves like a browser's local
//! storage: string keys, string values. Two backends implement it:
//!
//! - [`KvStore`]: redb (pure Rust, no FFI), file-backed or `:memory:`
//! - [`MemoryStorage`]: in-process map with an optional byte quota
//!
//! ```
//! use tether_kv::{MemoryStorage, StorageBackend};
//!
//! let store = MemoryStorage::new();
//! store.set_item("token", "abc123").unwrap();
//! assert_eq!(store.get_item("token").unwrap().as_deref(), Some("abc123"));
//! ```
//!
//! Binary payloads are packed into strings with [`flate::zip64`].

mod backend;
mod error;
pub mod flate;
mod location;
mod memory;
mod store;

pub use backend::StorageBackend;
pub use error::{KvError, KvResult};
pub use location::Location;
pub use memory::MemoryStorage;
pub use store::KvStore;
