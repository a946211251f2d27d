use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axial_config::ModelConfig;
use axial_model::{GeminiClient, ModelClient};
use axial_store::StoreError;

/// Extra time per item on top of the per-request timeouts, for retry waits.
const RETRY_SLACK: Duration = Duration::from_secs(90);

/// Build the model client, failing fast when credentials are missing.
pub fn model_client(config: &ModelConfig) -> anyhow::Result<Arc<dyn ModelClient>> {
    config
        .backend()
        .context("model credentials are not configured")?;
    let client = GeminiClient::from_config(config).context("failed to build model client")?;
    tracing::debug!(url = client.url(), "model endpoint");
    Ok(Arc::new(client))
}

/// Time budget for one item: every attempt may use the full request timeout.
pub fn call_budget(config: &ModelConfig) -> Duration {
    Duration::from_secs(
        config
            .timeout_secs
            .saturating_mul(u64::from(config.max_attempts.max(1))),
    ) + RETRY_SLACK
}

/// Alert id to tenant, from the input file when it is available.
pub fn tenants_from_input(input: &Path) -> anyhow::Result<HashMap<String, String>> {
    match axial_store::read_feedback(input) {
        Ok(records) => Ok(axial_pipeline::tenant_map(&records)),
        Err(StoreError::InputNotFound(path)) => {
            tracing::warn!(path = %path.display(), "input file not found; tenants reported as Unknown");
            Ok(HashMap::new())
        }
        Err(e) => Err(e).context("failed to read feedback input"),
    }
}
