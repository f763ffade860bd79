//! Portable JSON export and import.
//!
//! Exports are pretty-printed UTF-8 JSON files named
//! `{kind}-YYYY-MM-DD.json` so users can tell at a glance what a file
//! holds and when it was written. Unlike store persistence, failures here
//! are returned to the caller: import and export are user-initiated and
//! expect a visible outcome.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use murmur_core::error::{MurmurError, Result};

/// The export filename convention for a record kind, dated today.
pub fn export_file_name(kind: &str) -> String {
    format!("{}-{}.json", kind, Utc::now().format("%Y-%m-%d"))
}

/// Writes an export document into `dir`, creating the directory if needed.
///
/// `json` is the already-serialized portable representation (see the
/// stores' `export_json`). Returns the path of the written file.
pub fn write_export(dir: &Path, kind: &str, json: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(kind));
    fs::write(&path, json)?;
    debug!(kind, path = %path.display(), "wrote export file");
    Ok(path)
}

/// Reads an import document chosen by the user.
///
/// # Errors
///
/// Returns `NotFound` when the path does not exist, or an IO error when it
/// cannot be read.
pub fn read_import(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(MurmurError::not_found(
            "import file",
            path.display().to_string(),
        ));
    }
    Ok(fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_file_name_embeds_kind_and_date() {
        let name = export_file_name("sessions");
        let date = Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(name, format!("sessions-{}.json", date));
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("exports");

        let path = write_export(&dir, "prompts", "[]").unwrap();
        assert!(path.starts_with(&dir));
        assert_eq!(read_import(&path).unwrap(), "[]");
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_import(&temp_dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, MurmurError::NotFound { .. }));
    }
}
