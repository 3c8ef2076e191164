use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{KvError, KvResult};

/// Where an application's data lives.
///
/// - In a string store, data goes under the key `"{bin_name}/v{version}/{profile}"`.
/// - On disk, the redb file for the application is
///   `{data_dir}/{bin_name}/v{version}/{profile}.redb`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Location {
    /// Name of the application binary
    pub bin_name: String,
    /// Version of the stored data format
    pub version: String,
    /// Profile name, `"default"` unless there are several users
    pub profile: String,
}

impl Location {
    /// Location for an application with the default profile
    pub fn for_app(bin_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            bin_name: bin_name.into(),
            version: version.into(),
            profile: String::from("default"),
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Key to store the data under
    pub fn key(&self) -> String {
        format!("{}/v{}/{}", self.bin_name, self.version, self.profile)
    }

    /// Path of the on-disk store in the user's data directory
    pub fn path(&self) -> KvResult<PathBuf> {
        let root = dirs::data_dir()
            .ok_or_else(|| KvError::InvalidPath("couldn't find data dir".to_string()))?;
        Ok(root
            .join(&self.bin_name)
            .join(format!("v{}", self.version))
            .join(&self.profile)
            .with_extension("redb"))
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::for_app("tether", env!("CARGO_PKG_VERSION"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key() {
        let location = Location::for_app("clipboardinator", "1.2.0");
        assert_eq!(location.key(), "clipboardinator/v1.2.0/default");
        assert_eq!(
            location.with_profile("alice").key(),
            "clipboardinator/v1.2.0/alice"
        );
    }

    #[test]
    fn test_default_profile() {
        let location = Location::default();
        assert_eq!(location.bin_name, "tether");
        assert_eq!(location.profile, "default");
    }

    #[test]
    fn test_path_layout() {
        // CI machines may have no data dir
        if let Ok(path) = Location::for_app("app", "3").path() {
            assert!(path.ends_with("app/v3/default.redb"));
        }
    }
}
