use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use shared::{
    domain::{FormState, ModelSelection, RequestState},
    payload,
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};
use url::Url;

pub mod config;
pub mod error;
pub mod transport;
pub mod types;

pub use config::{ConfigError, OrchestratorConfig};
pub use error::{classify_response, PredictionError};
pub use transport::{HttpTransport, PredictionTransport, TransportError};
pub use types::{InvocationToken, TransportResponse};

/// Owns the request lifecycle: sends one call per invocation, bounds it
/// with a timeout, and publishes the resulting [`RequestState`].
pub struct PredictionOrchestrator<T: PredictionTransport = HttpTransport> {
    transport: T,
    endpoint: Url,
    request_timeout: Duration,
    suppress_stale: bool,
    latest_token: AtomicU64,
    state: watch::Sender<RequestState>,
}

impl PredictionOrchestrator<HttpTransport> {
    pub fn new(config: OrchestratorConfig) -> Result<Self, ConfigError> {
        Self::with_transport(config, HttpTransport::new())
    }
}

impl<T: PredictionTransport> PredictionOrchestrator<T> {
    pub fn with_transport(config: OrchestratorConfig, transport: T) -> Result<Self, ConfigError> {
        let endpoint = config.validate()?;
        let (state, _) = watch::channel(RequestState::Idle);
        Ok(Self {
            transport,
            endpoint,
            request_timeout: config.request_timeout,
            suppress_stale: config.suppress_stale,
            latest_token: AtomicU64::new(0),
            state,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn current_state(&self) -> RequestState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every visible state change.
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state.subscribe()
    }

    /// Runs one invocation to completion and returns its terminal state.
    ///
    /// The visible state is updated unless stale suppression is on and a
    /// newer invocation started in the meantime; the returned value is
    /// this invocation's own outcome either way.
    pub async fn predict(&self, form: &FormState, selection: ModelSelection) -> RequestState {
        let token = self.begin(selection);
        let payload = payload::build(form);
        info!(%token, %selection, url = %self.endpoint, "prediction: dispatching");
        debug!(%token, ?payload, "prediction: request body");

        let call = self.transport.post_json(&self.endpoint, &payload);
        let outcome = match tokio::time::timeout(self.request_timeout, call).await {
            Ok(Ok(response)) => classify_response(&response, selection),
            Ok(Err(err)) => Err(PredictionError::Transport(err)),
            Err(_) => Err(PredictionError::Timeout),
        };

        let settled = match outcome {
            Ok(result) => {
                info!(%token, %selection, %result, "prediction: succeeded");
                RequestState::Succeeded { selection, result }
            }
            Err(err) => {
                match &err {
                    PredictionError::Transport(source) => {
                        warn!(%token, %selection, error = %source, "prediction: transport failure")
                    }
                    PredictionError::HttpStatus { status, .. } => {
                        warn!(%token, %selection, status, error = %err, "prediction: failure status")
                    }
                    other => {
                        warn!(%token, %selection, kind = ?other.kind(), error = %other, "prediction: failed")
                    }
                }
                RequestState::Failed {
                    selection,
                    message: err.to_string(),
                }
            }
        };

        self.settle(token, settled.clone());
        settled
    }

    fn begin(&self, selection: ModelSelection) -> InvocationToken {
        let mut token = InvocationToken(0);
        self.state.send_modify(|state| {
            token = InvocationToken(self.latest_token.fetch_add(1, Ordering::SeqCst) + 1);
            *state = RequestState::Loading { selection };
        });
        token
    }

    /// Writes the terminal state. Token check and write happen under the
    /// channel's lock so a concurrent `begin` cannot interleave.
    fn settle(&self, token: InvocationToken, settled: RequestState) {
        self.state.send_if_modified(|state| {
            let latest = InvocationToken(self.latest_token.load(Ordering::SeqCst));
            if self.suppress_stale && latest != token {
                debug!(%token, %latest, "prediction: superseded, outcome not shown");
                return false;
            }
            *state = settled;
            true
        });
    }
}

impl<T: PredictionTransport + 'static> PredictionOrchestrator<T> {
    /// Spawns [`Self::predict`] so the caller is not blocked.
    pub fn dispatch(
        self: &Arc<Self>,
        form: FormState,
        selection: ModelSelection,
    ) -> JoinHandle<RequestState> {
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move { orchestrator.predict(&form, selection).await })
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod orchestrator_tests;
