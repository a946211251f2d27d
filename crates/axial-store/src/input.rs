//! Feedback input loading.

use std::path::Path;

use axial_core::FeedbackRecord;

use crate::error::StoreError;

/// Read the feedback export: a single JSON array of records.
///
/// # Errors
///
/// Returns [`StoreError::InputNotFound`] when the file is absent and
/// [`StoreError::InvalidInput`] when it is not a record array.
pub fn read_feedback(path: &Path) -> Result<Vec<FeedbackRecord>, StoreError> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StoreError::InputNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(StoreError::io(path, e)),
    };
    let records = FeedbackRecord::parse_many(&json).map_err(|source| StoreError::InvalidInput {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), records = records.len(), "loaded feedback input");
    Ok(records)
}
