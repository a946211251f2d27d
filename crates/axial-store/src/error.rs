//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from reading or writing Axial's files.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure on a specific path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The feedback input file is missing.
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The feedback input file is not a JSON array of records.
    #[error("invalid input file {}: {source}", path.display())]
    InvalidInput {
        path: PathBuf,
        #[source]
        source: axial_core::CoreError,
    },

    /// A value could not be encoded.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
