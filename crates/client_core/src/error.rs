use serde_json::Value;
use shared::{
    domain::ModelSelection,
    error::ErrorKind,
    protocol::{error_text, PredictionResponse, ERROR_FIELD},
};
use thiserror::Error;

use crate::{transport::TransportError, types::TransportResponse};

/// Why an invocation settled as failed. `Display` is the text shown to
/// the user.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("could not reach the prediction service")]
    Transport(#[source] TransportError),
    #[error("request timed out")]
    Timeout,
    #[error("{message}")]
    HttpStatus { status: u16, message: String },
    #[error("invalid JSON response: {body}")]
    Parse { body: String },
    #[error("{0}")]
    Business(String),
    #[error("invalid response format")]
    Schema,
}

impl PredictionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictionError::Transport(_) => ErrorKind::Transport,
            PredictionError::Timeout => ErrorKind::Timeout,
            PredictionError::HttpStatus { .. } => ErrorKind::HttpStatus,
            PredictionError::Parse { .. } => ErrorKind::Parse,
            PredictionError::Business(_) => ErrorKind::Business,
            PredictionError::Schema => ErrorKind::Schema,
        }
    }

    /// Uses the service's `error` text when the body carries one.
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| value.get(ERROR_FIELD).and_then(error_text))
            .unwrap_or_else(|| format!("request failed with status {status}"));
        PredictionError::HttpStatus { status, message }
    }
}

/// Turns a settled HTTP exchange into the selected model's result.
pub fn classify_response(
    response: &TransportResponse,
    selection: ModelSelection,
) -> Result<String, PredictionError> {
    if !response.is_success() {
        return Err(PredictionError::http_status(
            response.status,
            &response.body,
        ));
    }

    let value: Value =
        serde_json::from_str(&response.body).map_err(|_| PredictionError::Parse {
            body: response.body.clone(),
        })?;

    match PredictionResponse::from_json(&value) {
        PredictionResponse::BusinessError { message } => Err(PredictionError::Business(message)),
        PredictionResponse::Malformed => Err(PredictionError::Schema),
        success => success
            .result_for(selection)
            .map(str::to_string)
            .ok_or(PredictionError::Schema),
    }
}
