//! Configuration file parsing for tether.toml.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tether_host::BridgeConfig;

/// Main configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Storage, clipboard and location settings for the bridge
    #[serde(flatten)]
    pub bridge: BridgeConfig,

    /// Script session settings
    #[serde(default)]
    pub session: SessionConfig,
}

/// Script session configuration.
#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    /// Ticks to run after the script before giving up on pending operations
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u32,

    /// Echo each command before running it
    #[serde(default)]
    pub echo: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
            echo: false,
        }
    }
}

fn default_max_ticks() -> u32 {
    16
}

/// Load configuration from a file or search for default config files.
///
/// An explicit path that does not exist is an error; a missing searched
/// file falls back to the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    }
    let config_path = path.map(PathBuf::from).or_else(find_config_file);

    match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)?;
            parse_config(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))
        }
        None => Ok(Config::default()),
    }
}

fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

/// Search for a configuration file in the current directory and its parents.
fn find_config_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_ancestors(&cwd)
}

fn find_config_in_ancestors(start: &Path) -> Option<PathBuf> {
    const CONFIG_NAMES: &[&str] = &["tether.toml", ".tetherrc.toml"];

    let mut dir = Some(start);
    while let Some(current) = dir {
        for name in CONFIG_NAMES {
            let path = current.join(name);
            if path.exists() {
                return Some(path);
            }
        }
        dir = current.parent();
    }

    None
}
