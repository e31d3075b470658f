use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "/api/predict";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Construction-time settings for [`crate::PredictionOrchestrator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Absolute URL, or a path resolved against `origin`.
    pub endpoint_url: String,
    pub origin: Option<String>,
    /// Hard ceiling on one invocation, body included.
    pub request_timeout: Duration,
    /// Drop the visible outcome of an invocation superseded by a newer one.
    pub suppress_stale: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT.into(),
            origin: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            suppress_stale: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("relative endpoint '{endpoint}' requires an origin")]
    MissingOrigin { endpoint: String },
    #[error("invalid endpoint url '{url}': {source}")]
    InvalidEndpoint {
        url: String,
        source: url::ParseError,
    },
    #[error("invalid origin '{url}': {source}")]
    InvalidOrigin {
        url: String,
        source: url::ParseError,
    },
    #[error("unsupported scheme '{scheme}' in endpoint '{url}'")]
    UnsupportedScheme { scheme: String, url: String },
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
}

impl OrchestratorConfig {
    pub fn with_endpoint(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            ..Self::default()
        }
    }

    pub fn resolve_endpoint(&self) -> Result<Url, ConfigError> {
        let endpoint = match self.endpoint_url.trim() {
            "" => DEFAULT_ENDPOINT,
            trimmed => trimmed,
        };

        let url = match Url::parse(endpoint) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let Some(origin) = self.origin.as_deref().map(str::trim) else {
                    return Err(ConfigError::MissingOrigin {
                        endpoint: endpoint.to_string(),
                    });
                };
                let base = Url::parse(origin).map_err(|source| ConfigError::InvalidOrigin {
                    url: origin.to_string(),
                    source,
                })?;
                base.join(endpoint)
                    .map_err(|source| ConfigError::InvalidEndpoint {
                        url: endpoint.to_string(),
                        source,
                    })?
            }
            Err(source) => {
                return Err(ConfigError::InvalidEndpoint {
                    url: endpoint.to_string(),
                    source,
                })
            }
        };

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::UnsupportedScheme {
                scheme: scheme.to_string(),
                url: url.to_string(),
            }),
        }
    }

    pub(crate) fn validate(&self) -> Result<Url, ConfigError> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        self.resolve_endpoint()
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
