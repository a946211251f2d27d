//! # axial-store
//!
//! File persistence for Axial.
//!
//! - [`ResultStore`]: append-only NDJSON classification results, doubling as
//!   the resume checkpoint.
//! - [`read_feedback`]: the feedback export the pipeline consumes.
//! - [`write_trends`]: the global trend summary written next to the results.

mod error;
mod input;
mod results;
mod trends;

pub use error::StoreError;
pub use input::read_feedback;
pub use results::{ResultStore, load_processed_ids, load_results};
pub use trends::{read_trends, write_trends};
