//! # axial-config
//!
//! Layered configuration loading for Axial using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`AXIAL_*` prefix, `__` as separator)
//! 2. Well-known Google Cloud / Gemini variables (see [`WELL_KNOWN_ENV`])
//! 3. Project-level `.axial/config.toml`
//! 4. User-level `~/.config/axial/config.toml`
//! 5. Built-in defaults
//!
//! Command-line flags are applied on top by `axial-cli`.
//!
//! # Environment Variable Mapping
//!
//! Figment maps `AXIAL_MODEL__PROJECT` -> `model.project`, `AXIAL_RUN__WORKERS` -> `run.workers`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use axial_config::AxialConfig;
//!
//! let config = AxialConfig::load_with_dotenv().expect("config");
//!
//! if config.model.is_configured() {
//!     println!("model: {}", config.model.name);
//! }
//! ```

mod error;
mod model;
mod run;

pub use error::ConfigError;
pub use model::{ModelBackend, ModelConfig};
pub use run::{RunConfig, TRENDS_FILE_NAME};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Conventional variables honored as fallbacks, in merge order (later wins).
pub const WELL_KNOWN_ENV: [(&str, &str); 5] = [
    ("GOOGLE_CLOUD_PROJECT", "model.project"),
    ("GOOGLE_CLOUD_LOCATION", "model.location"),
    ("GOOGLE_CLOUD_ACCESS_TOKEN", "model.access_token"),
    ("GEMINI_API_KEY", "model.api_key"),
    ("GOOGLE_AI_API_KEY", "model.api_key"),
];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AxialConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub run: RunConfig,
}

impl AxialConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".axial/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        for (var, path) in WELL_KNOWN_ENV {
            figment = figment.merge(Env::raw().only(&[var]).map(move |_| path.into()));
        }

        figment.merge(Env::prefixed("AXIAL_").split("__"))
    }

    /// Check values that deserialize fine but cannot drive a run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.model.validate()?;
        self.run.validate()
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("axial").join("config.toml"))
    }

    /// Load `.env` from the current directory, if present.
    fn load_dotenv() {
        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = AxialConfig::default();
        assert!(!config.model.is_configured());
        assert_eq!(config.run.workers, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            let config: AxialConfig = AxialConfig::figment().extract()?;
            assert!(!config.model.is_configured());
            assert_eq!(config.model.name, "gemini-2.5-flash");
            assert_eq!(config.run.workers, 5);
            Ok(())
        });
    }
}
