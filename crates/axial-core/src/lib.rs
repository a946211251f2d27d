//! # axial-core
//!
//! Core types shared across all Axial crates:
//! - Input records as produced by the trace-fetch step (`feedback_alerts.json`)
//! - The closed theme taxonomy and its model-label coercion
//! - Prior automated assessment extraction from nested trace data
//! - Classification results and trend summaries as persisted on disk
//! - Candidate selection (eligibility + resume filtering)
//! - Cross-cutting error types

pub mod assessment;
pub mod errors;
pub mod record;
pub mod result;
pub mod select;
pub mod theme;
pub mod trends;

pub use assessment::PriorAssessment;
pub use errors::CoreError;
pub use record::FeedbackRecord;
pub use result::ClassificationResult;
pub use select::{Selection, select_candidates};
pub use theme::Theme;
pub use trends::{TrendEntry, TrendInsight, TrendSummary};
