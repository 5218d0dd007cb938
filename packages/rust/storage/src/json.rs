use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rankscout_shared::{RankScoutError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Read a JSON document. Returns `Ok(None)` when the file does not exist.
///
/// Unreadable or malformed files are reported as persistence failures so the
/// caller can decide to continue on an empty in-memory store.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| RankScoutError::persistence(path, format!("read failed: {e}")))?;

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| RankScoutError::persistence(path, format!("invalid JSON: {e}")))
}

/// Write a JSON document atomically (write to a temp file, then rename).
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| RankScoutError::persistence(parent, format!("create dir failed: {e}")))?;
    }

    let json = serde_json::to_string_pretty(value)
        .map_err(|e| RankScoutError::persistence(path, format!("serialize failed: {e}")))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store.json".into());
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, &json)
        .map_err(|e| RankScoutError::persistence(&temp, format!("write failed: {e}")))?;
    std::fs::rename(&temp, path)
        .map_err(|e| RankScoutError::persistence(path, format!("rename failed: {e}")))?;

    debug!(path = %path.display(), bytes = json.len(), "wrote json document");
    Ok(())
}

/// Rename an unreadable document to `<name>.corrupt-<timestamp>` so a fresh
/// store can be saved in its place without losing the original bytes.
///
/// Returns `Ok(None)` when there is nothing at `path`.
pub fn move_aside(path: &Path, now: DateTime<Utc>) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store.json".into());
    let target = path.with_file_name(format!(
        "{file_name}.corrupt-{}",
        now.format("%Y%m%dT%H%M%S%3f")
    ));

    std::fs::rename(path, &target)
        .map_err(|e| RankScoutError::persistence(path, format!("move aside failed: {e}")))?;
    warn!(from = %path.display(), to = %target.display(), "moved unreadable document aside");
    Ok(Some(target))
}
