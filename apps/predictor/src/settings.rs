use std::{collections::HashMap, fs, path::Path, time::Duration};

use client_core::{config::DEFAULT_ENDPOINT, OrchestratorConfig};
use tracing::warn;

pub const SETTINGS_FILE: &str = "predictor.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub origin: Option<String>,
    pub request_timeout_secs: u64,
    pub suppress_stale: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_ENDPOINT.into(),
            origin: Some("http://localhost:3000".into()),
            request_timeout_secs: 30,
            suppress_stale: true,
        }
    }
}

impl Settings {
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            endpoint_url: self.api_url.clone(),
            origin: self.origin.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            suppress_stale: self.suppress_stale,
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the settings file, then environment overrides.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("api_url") {
                    settings.api_url = v.clone();
                }
                if let Some(v) = file_cfg.get("origin") {
                    settings.origin = Some(v.clone());
                }
                if let Some(parsed) = file_cfg
                    .get("request_timeout_secs")
                    .and_then(|v| v.parse::<u64>().ok())
                {
                    settings.request_timeout_secs = parsed;
                }
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "settings: ignoring malformed file");
            }
        }
    }

    if let Some(v) = env("PREDICT_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("PREDICT_ORIGIN") {
        settings.origin = Some(v);
    }
    if let Some(v) = env("APP__ORIGIN") {
        settings.origin = Some(v);
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    settings
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
