use anyhow::Context;
use axial_config::AxialConfig;
use axial_pipeline::Aggregator;
use axial_store::load_results;

use crate::bootstrap::apply_paths;
use crate::cli::{GlobalFlags, PathArgs};
use crate::commands::classify::save_trends;
use crate::commands::shared::{model_client, tenants_from_input};
use crate::output::output;

/// Handle `axial trends`.
pub async fn handle(
    args: &PathArgs,
    mut config: AxialConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    apply_paths(&mut config.run, args);
    let model = model_client(&config.model)?;

    let results = load_results(&config.run.output).context("failed to read stored results")?;
    if results.is_empty() {
        tracing::warn!(path = %config.run.output.display(), "no stored results to analyze");
    }
    let tenants = tenants_from_input(&config.run.input)?;

    let summary = Aggregator::new(model).summarize(&results, &tenants).await;
    let outcome = save_trends(&config.run.trends_path(), summary)?;
    output(&outcome, flags.format)
}
