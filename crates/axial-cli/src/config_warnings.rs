use axial_config::AxialConfig;

/// Variables under the `AXIAL_` prefix that are not config paths.
const NON_CONFIG_VARS: &[&str] = &["AXIAL_LOG"];

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_misnamed_env(config: &AxialConfig) {
    for warning in collect_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_warnings<I>(config: &AxialConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut misnamed = env
        .into_iter()
        .map(|(key, _)| key)
        .filter(|key| key.starts_with("AXIAL_") && !key.contains("__"))
        .filter(|key| !NON_CONFIG_VARS.contains(&key.as_str()))
        .collect::<Vec<_>>();
    misnamed.sort();

    let mut warnings = Vec::new();
    if !misnamed.is_empty() {
        warnings.push(format!(
            "Ignoring {}. Use double underscores between section and key (example: AXIAL_MODEL__PROJECT).",
            misnamed.join(", ")
        ));
    }

    if !config.model.is_configured() && !config.model.project.is_empty() {
        warnings.push(
            "A Vertex AI project is set but no access token. Set GOOGLE_CLOUD_ACCESS_TOKEN (example: $(gcloud auth print-access-token))."
                .to_string(),
        );
    }

    warnings
}
