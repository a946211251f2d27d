//! Append-only NDJSON result store.
//!
//! One [`ClassificationResult`] per line. The file is also the resume
//! checkpoint: every identifier present in it counts as processed.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use axial_core::ClassificationResult;
use serde::Deserialize;

use crate::error::StoreError;

/// Only the identifier is needed to rebuild the processed set.
#[derive(Deserialize)]
struct StoredId {
    #[serde(default)]
    alert_id: Option<String>,
}

/// Appends classification results and tracks which alerts are done.
///
/// Safe to share across tasks: appends are serialized, each record is
/// written with a single append and flushed before its id joins the
/// processed set.
#[derive(Debug)]
pub struct ResultStore {
    path: PathBuf,
    processed: Mutex<HashSet<String>>,
}

impl ResultStore {
    /// Open (or prepare) the store at `path`, loading the processed set.
    ///
    /// Creates the parent directory if it doesn't exist. A missing file is an
    /// empty store. A final line cut off mid-write is terminated so the next
    /// append starts on a fresh line.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the directory cannot be created or the
    /// existing file cannot be read or repaired.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        terminate_partial_line(&path).map_err(|e| StoreError::io(&path, e))?;
        let processed = load_processed_ids(&path)?;
        tracing::info!(
            path = %path.display(),
            processed = processed.len(),
            "opened result store"
        );
        Ok(Self {
            path,
            processed: Mutex::new(processed),
        })
    }

    /// Append one result and mark its alert as processed.
    ///
    /// A result for an alert that is already stored is dropped, so the file
    /// never holds two lines for one id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the line cannot be written. The id is not
    /// marked processed in that case.
    pub fn append(&self, result: &ClassificationResult) -> Result<(), StoreError> {
        let mut processed = self.processed.lock().unwrap_or_else(PoisonError::into_inner);
        if processed.contains(&result.alert_id) {
            tracing::warn!(alert_id = %result.alert_id, "result already stored, dropping duplicate");
            return Ok(());
        }
        serde_jsonlines::append_json_lines(&self.path, [result])
            .map_err(|e| StoreError::io(&self.path, e))?;
        processed.insert(result.alert_id.clone());
        Ok(())
    }

    /// Whether a result for `alert_id` is already stored.
    #[must_use]
    pub fn contains(&self, alert_id: &str) -> bool {
        self.processed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(alert_id)
    }

    /// Snapshot of the processed identifiers.
    #[must_use]
    pub fn processed_ids(&self) -> HashSet<String> {
        self.processed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Read back every well-formed result in the store.
    ///
    /// # Errors
    ///
    /// See [`load_results`].
    pub fn results(&self) -> Result<Vec<ClassificationResult>, StoreError> {
        load_results(&self.path)
    }

    /// The NDJSON file this store appends to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Add the missing `\n` after a final line left unterminated by a crash.
fn terminate_partial_line(path: &Path) -> std::io::Result<()> {
    let mut file = match OpenOptions::new().read(true).append(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if file.metadata()?.len() == 0 {
        return Ok(());
    }
    let mut last = [0_u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        tracing::warn!(path = %path.display(), "terminating truncated last line");
        file.write_all(b"\n")?;
        file.sync_data()?;
    }
    Ok(())
}

/// Collect the identifiers already present in the store file.
///
/// Malformed lines and lines without an id are skipped with a warning.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file exists but cannot be read.
pub fn load_processed_ids(path: &Path) -> Result<HashSet<String>, StoreError> {
    let mut ids = HashSet::new();
    for (line, record) in read_lenient::<StoredId>(path)? {
        match record.alert_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                ids.insert(id);
            }
            None => tracing::warn!(path = %path.display(), line, "stored result has no alert_id"),
        }
    }
    Ok(ids)
}

/// Read every well-formed result in an NDJSON store file.
///
/// A missing file yields no results; malformed lines are skipped with a warning.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file exists but cannot be read.
pub fn load_results(path: &Path) -> Result<Vec<ClassificationResult>, StoreError> {
    Ok(read_lenient(path)?
        .into_iter()
        .map(|(_, result)| result)
        .collect())
}

/// Decode each line, pairing values with their 1-based line number.
fn read_lenient<T>(path: &Path) -> Result<Vec<(usize, T)>, StoreError>
where
    T: for<'de> Deserialize<'de>,
{
    let lines = match serde_jsonlines::json_lines::<T, _>(path) {
        Ok(lines) => lines,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let mut values = Vec::new();
    for (idx, item) in lines.enumerate() {
        match item {
            Ok(value) => values.push((idx + 1, value)),
            Err(e) if e.kind() == ErrorKind::InvalidData || e.kind() == ErrorKind::UnexpectedEof => {
                tracing::warn!(path = %path.display(), line = idx + 1, error = %e, "skipping malformed line");
            }
            Err(e) => return Err(StoreError::io(path, e)),
        }
    }
    Ok(values)
}
