//! File I/O utilities.
//!
//! This module provides common file operations used across the workspace,
//! including atomic JSON saves for the disk-backed stores (dynamic
//! ontology, unknown-ingredient log).

use crate::error::{FoundationError, Result};
use std::path::Path;

/// Read a JSON file and deserialize it.
pub fn read_json<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        FoundationError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read JSON from {}: {}", path.display(), e),
        ))
    })?;
    serde_json::from_str(&content).map_err(Into::into)
}

/// Write a value as JSON to a file.
pub fn write_json<T>(path: impl AsRef<Path>, value: &T, pretty: bool) -> Result<()>
where
    T: serde::Serialize,
{
    let path = path.as_ref();
    let content = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    std::fs::write(path, content).map_err(|e| {
        FoundationError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to write JSON to {}: {}", path.display(), e),
        ))
    })?;
    Ok(())
}

/// Write a value as pretty JSON via a temporary file and atomic rename.
///
/// The rewrite-then-rename discipline keeps readers from ever observing a
/// partially written store file.
pub fn write_json_atomic<T>(path: impl AsRef<Path>, value: &T) -> Result<()>
where
    T: serde::Serialize,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let content = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, content).map_err(|e| {
        FoundationError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to write {}: {}", tmp.display(), e),
        ))
    })?;
    std::fs::rename(&tmp, path).map_err(|e| {
        FoundationError::Io(std::io::Error::new(
            e.kind(),
            format!(
                "Failed to rename {} to {}: {}",
                tmp.display(),
                path.display(),
                e
            ),
        ))
    })?;
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
