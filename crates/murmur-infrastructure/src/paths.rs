//! Unified path management for Murmur data files.
//!
//! All store files live under the platform data directory so the desktop
//! shell, the export flow, and the "open storage directory" action agree on
//! one location.

use std::path::{Path, PathBuf};
use std::process::Command;

use murmur_core::error::{MurmurError, Result};

#[cfg(target_os = "macos")]
const DIRECTORY_OPENER: &str = "open";
#[cfg(target_os = "windows")]
const DIRECTORY_OPENER: &str = "explorer";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const DIRECTORY_OPENER: &str = "xdg-open";

/// Unified path management for Murmur.
///
/// # Directory Structure
///
/// ```text
/// ~/.local/share/murmur/       # Data directory (platform equivalent)
/// ├── store/                   # One JSON document per record kind
/// │   ├── sessions.json
/// │   ├── prompts.json
/// │   └── models.json
/// ├── local.json               # Key-value store backing file
/// └── exports/                 # Default target for JSON exports
/// ```
pub struct MurmurPaths;

impl MurmurPaths {
    /// Returns the Murmur data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory cannot be
    /// determined.
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join("murmur"))
            .ok_or_else(|| MurmurError::io("cannot determine platform data directory"))
    }

    /// Returns the directory holding the per-kind store documents.
    pub fn store_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("store"))
    }

    /// Returns the path of the key-value store backing file.
    pub fn key_value_file() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("local.json"))
    }

    /// Returns the default directory for JSON exports.
    pub fn exports_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("exports"))
    }

    /// Opens `path` in the platform file manager.
    ///
    /// Backs the "open storage directory" action in the settings UI.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the directory does not exist, or an IO error
    /// when the platform opener cannot be spawned.
    pub fn open_directory(path: &Path) -> Result<()> {
        if !path.is_dir() {
            return Err(MurmurError::not_found(
                "directory",
                path.display().to_string(),
            ));
        }
        Command::new(DIRECTORY_OPENER)
            .arg(path)
            .spawn()
            .map_err(|e| {
                MurmurError::io(format!("failed to open {}: {}", path.display(), e))
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_dir_is_under_data_dir() {
        let data = MurmurPaths::data_dir().unwrap();
        let store = MurmurPaths::store_dir().unwrap();
        assert!(store.starts_with(&data));
        assert!(store.ends_with("store"));
    }

    #[test]
    fn test_open_missing_directory_is_not_found() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let err = MurmurPaths::open_directory(&temp_dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, MurmurError::NotFound { .. }));
    }
}
