//! Panel configuration: Ollama endpoint, model, worker pool, log filter.
//!
//! Defaults target a local Ollama instance serving `medllama2`. Every field
//! can be overridden through `MEDPANEL_*` environment variables.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Medpanel";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One worker per specialist role.
pub const MIN_SPECIALIST_WORKERS: usize = 3;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "medllama2";
const DEFAULT_TIMEOUT_SECS: u64 = 300;

const ENV_OLLAMA_URL: &str = "MEDPANEL_OLLAMA_URL";
const ENV_MODEL: &str = "MEDPANEL_MODEL";
const ENV_TIMEOUT: &str = "MEDPANEL_TIMEOUT_SECS";
const ENV_WORKERS: &str = "MEDPANEL_WORKERS";
const ENV_LOG: &str = "MEDPANEL_LOG";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Specialist pool needs at least {minimum} workers (got {requested})")]
    TooFewWorkers { requested: usize, minimum: usize },

    #[error("Invalid worker count: {0}")]
    InvalidWorkers(String),

    #[error("Invalid request timeout: {0}")]
    InvalidTimeout(String),

    #[error("Model name is empty")]
    EmptyModel,

    #[error("Ollama URL is empty")]
    EmptyUrl,
}

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> String {
    "medpanel=info".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Base URL of the Ollama HTTP API.
    pub ollama_url: String,
    /// Model used for every generation call.
    pub model: String,
    /// Per-request timeout. The core itself never times out; this only
    /// bounds a single HTTP exchange with Ollama.
    pub request_timeout_secs: u64,
    /// Size of the pool that runs specialist calls concurrently.
    pub specialist_workers: usize,
    /// `EnvFilter` directive used when `RUST_LOG` is absent.
    pub log_filter: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            specialist_workers: MIN_SPECIALIST_WORKERS,
            log_filter: default_log_filter(),
        }
    }
}

impl PanelConfig {
    /// Defaults overlaid with `MEDPANEL_*` environment variables, validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_OLLAMA_URL) {
            config.ollama_url = url.trim().to_string();
        }
        if let Some(model) = lookup(ENV_MODEL) {
            config.model = model.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT) {
            config.request_timeout_secs = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
        }
        if let Some(raw) = lookup(ENV_WORKERS) {
            config.specialist_workers = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidWorkers(raw.clone()))?;
        }
        if let Some(filter) = lookup(ENV_LOG) {
            config.log_filter = filter;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ollama_url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl);
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("0".to_string()));
        }
        if self.specialist_workers < MIN_SPECIALIST_WORKERS {
            return Err(ConfigError::TooFewWorkers {
                requested: self.specialist_workers,
                minimum: MIN_SPECIALIST_WORKERS,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_target_local_medllama() {
        let config = PanelConfig::default();
        assert_eq!(config.ollama_url, "http://localhost:11434");
        assert_eq!(config.model, "medllama2");
        assert_eq!(config.specialist_workers, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_apply() {
        let config = PanelConfig::from_lookup(lookup_from(&[
            ("MEDPANEL_OLLAMA_URL", "http://gpu-box:11434"),
            ("MEDPANEL_MODEL", "meditron"),
            ("MEDPANEL_TIMEOUT_SECS", "60"),
            ("MEDPANEL_WORKERS", "6"),
        ]))
        .unwrap();
        assert_eq!(config.ollama_url, "http://gpu-box:11434");
        assert_eq!(config.model, "meditron");
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.specialist_workers, 6);
    }

    #[test]
    fn no_env_yields_defaults() {
        let config = PanelConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, PanelConfig::default());
    }

    #[test]
    fn pool_smaller_than_role_count_rejected() {
        let err = PanelConfig::from_lookup(lookup_from(&[("MEDPANEL_WORKERS", "2")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::TooFewWorkers {
                requested: 2,
                minimum: 3
            }
        );
    }

    #[test]
    fn unparsable_numbers_rejected() {
        assert!(matches!(
            PanelConfig::from_lookup(lookup_from(&[("MEDPANEL_WORKERS", "many")])),
            Err(ConfigError::InvalidWorkers(_))
        ));
        assert!(matches!(
            PanelConfig::from_lookup(lookup_from(&[("MEDPANEL_TIMEOUT_SECS", "-1")])),
            Err(ConfigError::InvalidTimeout(_))
        ));
    }

    #[test]
    fn empty_model_rejected() {
        let config = PanelConfig {
            model: "  ".into(),
            ..PanelConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyModel));
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = PanelConfig {
            request_timeout_secs: 0,
            ..PanelConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTimeout(_))));
    }

    #[test]
    fn app_name_is_medpanel() {
        assert_eq!(APP_NAME, "Medpanel");
    }
}
