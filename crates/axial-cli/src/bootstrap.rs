use std::path::Path;

use anyhow::Context;
use axial_config::{AxialConfig, ModelConfig, RunConfig};

use crate::cli::{ClassifyArgs, PathArgs};

/// Load `.env` and the layered configuration.
pub fn load_config() -> anyhow::Result<AxialConfig> {
    load_dotenv(Path::new(".env"))?;
    AxialConfig::load().context("failed to load configuration")
}

fn load_dotenv(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        return Ok(());
    }
    dotenvy::from_path(path)
        .with_context(|| format!("failed to load dotenv file at {}", path.display()))
}

/// Apply `--input` / `--output` over the configured paths.
pub fn apply_paths(run: &mut RunConfig, paths: &PathArgs) {
    if let Some(input) = &paths.input {
        run.input.clone_from(input);
    }
    if let Some(output) = &paths.output {
        run.output.clone_from(output);
    }
}

/// Apply `axial classify` flags over the loaded configuration.
pub fn apply_classify_args(config: &mut AxialConfig, args: &ClassifyArgs) {
    apply_model_args(&mut config.model, args);
    apply_paths(&mut config.run, &args.paths);
    if let Some(workers) = args.workers {
        config.run.workers = workers;
    }
    if args.limit.is_some() {
        config.run.limit = args.limit;
    }
}

fn apply_model_args(model: &mut ModelConfig, args: &ClassifyArgs) {
    if let Some(project) = &args.project {
        model.project.clone_from(project);
    }
    if let Some(location) = &args.location {
        model.location.clone_from(location);
    }
}
