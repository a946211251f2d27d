use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Classify analyst feedback into themes (resumes where the last run stopped).
    Classify(ClassifyArgs),
    /// Regenerate the global trend summary from stored results.
    Trends(PathArgs),
    /// Count stored results per theme, confidence and tenant (no model call).
    Summary(PathArgs),
}

/// Input and output file locations, overriding `run.input` / `run.output`.
#[derive(Clone, Debug, Default, Args)]
pub struct PathArgs {
    /// Feedback export (JSON array of records).
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// NDJSON result file, also the resume checkpoint.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `axial classify`.
#[derive(Clone, Debug, Default, Args)]
pub struct ClassifyArgs {
    /// GCP project for Vertex AI (or GOOGLE_CLOUD_PROJECT).
    #[arg(long)]
    pub project: Option<String>,
    /// GCP location for Vertex AI.
    #[arg(long)]
    pub location: Option<String>,
    #[command(flatten)]
    pub paths: PathArgs,
    /// Only consider the first N eligible records.
    #[arg(long)]
    pub limit: Option<usize>,
    /// Concurrent model calls.
    #[arg(long)]
    pub workers: Option<usize>,
    /// Generate the global trend summary after classification.
    #[arg(long)]
    pub global_trends: bool,
}
