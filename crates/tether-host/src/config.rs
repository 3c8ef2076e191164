//! Bridge configuration (`tether.toml`).

use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tether_kv::{KvResult, KvStore, Location, MemoryStorage, StorageBackend};

use crate::clipboard::{ClipboardBackend, DeniedClipboard, MemoryClipboard};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BridgeConfig {
    /// Storage backend settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Clipboard settings
    #[serde(default)]
    pub clipboard: ClipboardConfig,

    /// Namespace for packed application data
    #[serde(default)]
    pub location: Location,
}

/// Which storage backend to open.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-process map, lost on exit
    Memory {
        /// Byte quota over keys and values
        quota: Option<usize>,
    },
    /// redb file. Defaults to the location's path in the data directory.
    File { path: Option<PathBuf> },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Memory { quota: None }
    }
}

impl StorageConfig {
    /// Open the configured backend
    pub fn open(&self, location: &Location) -> KvResult<Arc<dyn StorageBackend>> {
        let backend: Arc<dyn StorageBackend> = match self {
            StorageConfig::Memory { quota: None } => Arc::new(MemoryStorage::new()),
            StorageConfig::Memory { quota: Some(quota) } => {
                Arc::new(MemoryStorage::with_quota(*quota))
            }
            StorageConfig::File { path } => {
                let path = match path {
                    Some(path) => path.clone(),
                    None => location.path()?,
                };
                Arc::new(KvStore::open(&path.to_string_lossy())?)
            }
        };
        Ok(backend)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardMode {
    #[default]
    Memory,
    /// Every clipboard call is rejected
    Denied,
}

/// Clipboard configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClipboardConfig {
    #[serde(default)]
    pub mode: ClipboardMode,

    /// Text on the clipboard at startup
    #[serde(default)]
    pub initial_text: String,
}

impl ClipboardConfig {
    /// Create the configured backend
    pub fn open(&self) -> Arc<dyn ClipboardBackend> {
        match self.mode {
            ClipboardMode::Memory => Arc::new(MemoryClipboard::new(self.initial_text.clone())),
            ClipboardMode::Denied => Arc::new(DeniedClipboard),
        }
    }
}

impl BridgeConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))
    }

    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_clipboard_mode(mut self, mode: ClipboardMode) -> Self {
        self.clipboard.mode = mode;
        self
    }

    pub fn with_initial_clipboard(mut self, text: impl Into<String>) -> Self {
        self.clipboard.initial_text = text.into();
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}
