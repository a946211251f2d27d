//! Bounded worker pool over the candidate records.
//!
//! Every candidate becomes a task on a [`JoinSet`]; a [`Semaphore`] limits how
//! many model calls are in flight. Completions are drained in the order they
//! finish, and each successful result is appended to the store right away.

use std::sync::Arc;
use std::time::Duration;

use axial_core::FeedbackRecord;
use axial_store::ResultStore;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::invoker::{ClassifyOutcome, Classifier, SkipReason};

const BAR_WIDTH: usize = 30;

/// Counters for one classification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Eligible records after the limit was applied.
    pub eligible: usize,
    /// Eligible records skipped because a result already existed.
    pub already_processed: usize,
    /// Records handed to the worker pool.
    pub submitted: usize,
    /// Records classified and stored.
    pub classified: usize,
    /// Records that produced no result.
    pub skipped: usize,
    /// Results that could not be written; these ids are retried next run.
    pub write_failures: usize,
}

/// Snapshot passed to progress observers after each completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    #[must_use]
    pub fn percent(self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let pct = self.completed as f64 / self.total as f64 * 100.0;
        pct
    }

    /// Text bar such as `[=====-----]`.
    #[must_use]
    pub fn bar(self) -> String {
        let filled = if self.total == 0 {
            BAR_WIDTH
        } else {
            (self.completed * BAR_WIDTH / self.total).min(BAR_WIDTH)
        };
        format!("[{}{}]", "=".repeat(filled), "-".repeat(BAR_WIDTH - filled))
    }
}

/// Callback invoked after every completion.
pub type ProgressFn = dyn Fn(Progress) + Send + Sync;

/// Runs classifications with bounded parallelism and records the results.
pub struct Scheduler {
    classifier: Classifier,
    store: Arc<ResultStore>,
    workers: usize,
    call_timeout: Duration,
    progress: Option<Arc<ProgressFn>>,
}

impl Scheduler {
    #[must_use]
    pub fn new(
        classifier: Classifier,
        store: Arc<ResultStore>,
        workers: usize,
        call_timeout: Duration,
    ) -> Self {
        Self {
            classifier,
            store,
            workers: workers.max(1),
            call_timeout,
            progress: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<ProgressFn>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Classify `candidates` and append every success to the store.
    ///
    /// Per-item failures are absorbed and counted; the batch always runs to
    /// completion. Only `submitted`, `classified`, `skipped` and
    /// `write_failures` are filled in.
    pub async fn run(&self, candidates: Vec<FeedbackRecord>) -> RunReport {
        let total = candidates.len();
        let mut report = RunReport {
            submitted: total,
            ..RunReport::default()
        };
        tracing::info!(total, workers = self.workers, "processing new items");

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut set = JoinSet::new();
        for record in candidates {
            set.spawn(run_one(
                self.classifier.clone(),
                record,
                Arc::clone(&semaphore),
                self.call_timeout,
            ));
        }

        let mut completed = 0;
        while let Some(joined) = set.join_next().await {
            completed += 1;
            match joined {
                Ok((_, ClassifyOutcome::Classified(result))) => {
                    match self.store.append(&result) {
                        Ok(()) => report.classified += 1,
                        Err(e) => {
                            tracing::error!(alert_id = %result.alert_id, error = %e, "failed to store result");
                            report.write_failures += 1;
                        }
                    }
                }
                Ok((alert_id, ClassifyOutcome::Skipped(reason))) => {
                    tracing::debug!(alert_id = %alert_id, %reason, "skipped");
                    report.skipped += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, "classification task failed");
                    report.skipped += 1;
                }
            }

            let progress = Progress { completed, total };
            tracing::info!(
                "{} {completed}/{total} ({:.1}%)",
                progress.bar(),
                progress.percent()
            );
            if let Some(observer) = &self.progress {
                observer(progress);
            }
        }

        tracing::info!(
            skipped = report.skipped,
            write_failures = report.write_failures,
            "classification complete: {}/{total} successful",
            report.classified
        );
        report
    }
}

/// Classify one record once a worker slot is free.
async fn run_one(
    classifier: Classifier,
    record: FeedbackRecord,
    semaphore: Arc<Semaphore>,
    call_timeout: Duration,
) -> (String, ClassifyOutcome) {
    let alert_id = record.id().unwrap_or_default().to_string();
    let Ok(_permit) = semaphore.acquire_owned().await else {
        return (alert_id, ClassifyOutcome::Skipped(SkipReason::Cancelled));
    };
    let outcome = match tokio::time::timeout(call_timeout, classifier.classify(&record)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::error!(alert_id = %alert_id, ?call_timeout, "model call timed out");
            ClassifyOutcome::Skipped(SkipReason::TimedOut)
        }
    };
    (alert_id, outcome)
}
