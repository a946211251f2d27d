//! # axial-pipeline
//!
//! The resumable, concurrent feedback classification pipeline.
//!
//! - [`prompt`]: instruction text, per-item prompt and response schemas
//! - [`invoker`]: one model call per record, validated into a result or a skip
//! - [`scheduler`]: bounded worker pool draining completions into the store
//! - [`run`]: candidate selection plus scheduling, returning a [`RunReport`]
//! - [`aggregator`]: model-generated trend summary over all results
//! - [`summary`]: offline theme / confidence / tenant distribution

pub mod aggregator;
pub mod error;
pub mod invoker;
pub mod prompt;
pub mod run;
pub mod scheduler;
pub mod summary;

pub use aggregator::{Aggregator, tenant_map};
pub use error::PipelineError;
pub use invoker::{ClassifyOutcome, Classifier, SkipReason};
pub use run::Pipeline;
pub use scheduler::{Progress, ProgressFn, RunReport, Scheduler};
pub use summary::ResultsSummary;
