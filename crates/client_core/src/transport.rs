use async_trait::async_trait;
use reqwest::Client;
use shared::payload::RequestPayload;
use thiserror::Error;
use url::Url;

use crate::types::TransportResponse;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Other(String),
}

/// Sends one prediction request. Dropping the returned future must abort
/// the underlying call.
#[async_trait]
pub trait PredictionTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &Url,
        payload: &RequestPayload,
    ) -> Result<TransportResponse, TransportError>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl PredictionTransport for HttpTransport {
    async fn post_json(
        &self,
        url: &Url,
        payload: &RequestPayload,
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .http
            .post(url.clone())
            .json(payload)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}
