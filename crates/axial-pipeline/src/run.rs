//! End-to-end classification run: select, schedule, store.

use std::sync::Arc;
use std::time::Duration;

use axial_core::{FeedbackRecord, select_candidates};
use axial_model::ModelClient;
use axial_store::ResultStore;

use crate::invoker::Classifier;
use crate::scheduler::{ProgressFn, RunReport, Scheduler};

/// Default worker pool width.
pub const DEFAULT_WORKERS: usize = 5;

/// Default time budget for one item, retries included.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(300);

/// A configured classification run over one result store.
pub struct Pipeline {
    classifier: Classifier,
    store: Arc<ResultStore>,
    workers: usize,
    call_timeout: Duration,
    progress: Option<Arc<ProgressFn>>,
}

impl Pipeline {
    #[must_use]
    pub fn new(model: Arc<dyn ModelClient>, store: Arc<ResultStore>) -> Self {
        Self {
            classifier: Classifier::new(model),
            store,
            workers: DEFAULT_WORKERS,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            progress: None,
        }
    }

    #[must_use]
    pub const fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub const fn call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<ProgressFn>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Classify every eligible record that has no stored result yet.
    ///
    /// `limit` caps the eligible set before already-processed records are
    /// removed, so repeated bounded runs finish the same first N records.
    pub async fn run(&self, records: &[FeedbackRecord], limit: Option<usize>) -> RunReport {
        let processed = self.store.processed_ids();
        let selection = select_candidates(records, &processed, limit);
        tracing::info!(
            records = records.len(),
            eligible = selection.eligible,
            already_processed = selection.already_processed,
            "selected candidates"
        );

        let candidates: Vec<FeedbackRecord> =
            selection.candidates.into_iter().cloned().collect();
        let mut scheduler = Scheduler::new(
            self.classifier.clone(),
            Arc::clone(&self.store),
            self.workers,
            self.call_timeout,
        );
        if let Some(progress) = &self.progress {
            scheduler = scheduler.with_progress(Arc::clone(progress));
        }

        RunReport {
            eligible: selection.eligible,
            already_processed: selection.already_processed,
            ..scheduler.run(candidates).await
        }
    }

    /// The store results are appended to.
    #[must_use]
    pub fn store(&self) -> &ResultStore {
        &self.store
    }
}
