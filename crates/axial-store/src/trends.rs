//! Trend summary file output.

use std::path::Path;

use axial_core::TrendSummary;

use crate::error::StoreError;

/// Write the trend summary as pretty JSON, replacing any previous file.
///
/// Writes to a sibling temp file first and renames it into place, so a
/// crash never leaves a truncated summary behind.
///
/// # Errors
///
/// Returns [`StoreError`] if the directory or file cannot be written.
pub fn write_trends(path: &Path, summary: &TrendSummary) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(summary)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| StoreError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))?;
    tracing::info!(path = %path.display(), trends = summary.trends.len(), "wrote trend summary");
    Ok(())
}

/// Read a previously written trend summary, if any.
///
/// # Errors
///
/// Returns [`StoreError`] when the file exists but cannot be read or decoded.
pub fn read_trends(path: &Path) -> Result<Option<TrendSummary>, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}
