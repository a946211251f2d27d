//! Cross-cutting error types for Axial.
//!
//! Domain-specific errors (`ModelError`, `StoreError`, `PipelineError`) live in
//! their respective crates. `anyhow` is only used in `axial-cli` where all crate
//! errors converge.

use thiserror::Error;

/// Errors that can be raised by core data handling.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A theme label outside the closed taxonomy.
    #[error("Unknown theme label: {0}")]
    UnknownTheme(String),

    /// The input document could not be decoded into feedback records.
    #[error("Invalid input document: {0}")]
    InvalidInput(#[from] serde_json::Error),
}
