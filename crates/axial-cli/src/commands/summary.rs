use anyhow::Context;
use axial_config::AxialConfig;
use axial_pipeline::ResultsSummary;
use axial_store::load_results;

use crate::bootstrap::apply_paths;
use crate::cli::{GlobalFlags, PathArgs};
use crate::commands::shared::tenants_from_input;
use crate::output::output;

/// Handle `axial summary`.
pub fn handle(args: &PathArgs, mut config: AxialConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    apply_paths(&mut config.run, args);

    let results = load_results(&config.run.output).context("failed to read stored results")?;
    let tenants = tenants_from_input(&config.run.input)?;
    output(&ResultsSummary::from_results(&results, &tenants), flags.format)
}
