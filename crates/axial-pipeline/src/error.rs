//! Pipeline error types.

use thiserror::Error;

/// Errors surfaced by pipeline operations that are not absorbed per item.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] axial_store::StoreError),

    #[error(transparent)]
    Model(#[from] axial_model::ModelError),

    /// The model answered, but not with the expected JSON document.
    #[error("invalid model response: {0}")]
    InvalidResponse(String),
}
