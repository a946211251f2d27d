use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axial_config::AxialConfig;
use axial_core::TrendSummary;
use axial_pipeline::{Aggregator, Pipeline, RunReport, tenant_map};
use axial_store::{ResultStore, read_feedback, write_trends};
use serde::Serialize;

use crate::bootstrap::apply_classify_args;
use crate::cli::{ClassifyArgs, GlobalFlags};
use crate::commands::shared::{call_budget, model_client};
use crate::output::output;
use crate::progress::RunProgress;

#[derive(Debug, Serialize)]
struct ClassifyResponse {
    #[serde(flatten)]
    report: RunReport,
    output: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    trends: Option<TrendsOutcome>,
}

#[derive(Debug, Serialize)]
pub(super) struct TrendsOutcome {
    /// Path written, or `None` when generation failed and the old file was kept.
    file: Option<PathBuf>,
    trends: usize,
    summary: String,
}

/// Handle `axial classify`.
pub async fn handle(
    args: &ClassifyArgs,
    mut config: AxialConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    apply_classify_args(&mut config, args);
    config.validate().context("invalid configuration")?;

    let model = model_client(&config.model)?;
    let records = read_feedback(&config.run.input).context("failed to load feedback input")?;
    tracing::info!(
        path = %config.run.input.display(),
        records = records.len(),
        "loaded feedback items"
    );
    let store = Arc::new(
        ResultStore::open(&config.run.output).context("failed to open result store")?,
    );

    let progress = RunProgress::new("classifying");
    let observer = {
        let progress = progress.clone();
        Arc::new(move |p: axial_pipeline::Progress| progress.update(p))
    };
    let report = Pipeline::new(Arc::clone(&model), Arc::clone(&store))
        .workers(config.run.workers)
        .call_timeout(call_budget(&config.model))
        .with_progress(observer)
        .run(&records, config.run.limit)
        .await;
    if report.submitted == 0 {
        progress.finish_clear();
        tracing::info!("no new items to process");
    } else {
        progress.finish_ok(&format!("{} classified", report.classified));
    }

    let trends = if args.global_trends {
        let results = store.results().context("failed to read stored results")?;
        let summary = Aggregator::new(model)
            .summarize(&results, &tenant_map(&records))
            .await;
        Some(save_trends(&config.run.trends_path(), summary)?)
    } else {
        None
    };

    output(
        &ClassifyResponse {
            report,
            output: config.run.output.clone(),
            trends,
        },
        flags.format,
    )
}

/// Write a successful summary; keep the previous file when generation failed.
pub(super) fn save_trends(
    path: &std::path::Path,
    summary: TrendSummary,
) -> anyhow::Result<TrendsOutcome> {
    let file = if summary.is_fallback() {
        tracing::warn!(path = %path.display(), "trend generation failed; previous summary left in place");
        None
    } else {
        write_trends(path, &summary).context("failed to write trend summary")?;
        Some(path.to_path_buf())
    };
    Ok(TrendsOutcome {
        file,
        trends: summary.trends.len(),
        summary: summary.summary,
    })
}
