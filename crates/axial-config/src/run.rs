//! Classification run configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the trend summary, written next to the output file.
pub const TRENDS_FILE_NAME: &str = "global_trends.json";

fn default_input() -> PathBuf {
    PathBuf::from("data/feedback_alerts.json")
}

fn default_output() -> PathBuf {
    PathBuf::from("data/axial_coding.json")
}

/// Default worker pool width.
const fn default_workers() -> usize {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    /// Feedback records exported by the trace-fetch step.
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// NDJSON result store (also the resume checkpoint).
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Number of concurrent model calls.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Cap on eligible records, for bounded test runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            workers: default_workers(),
            limit: None,
        }
    }
}

impl RunConfig {
    /// Path of the trend summary file.
    #[must_use]
    pub fn trends_path(&self) -> PathBuf {
        self.output
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(TRENDS_FILE_NAME)
    }

    /// Check field ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for zero workers or a zero limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "run.workers".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.limit == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "run.limit".into(),
                reason: "must be at least 1 when set".into(),
            });
        }
        Ok(())
    }
}
