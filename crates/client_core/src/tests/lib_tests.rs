use super::*;
use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use serde_json::Value;
use shared::domain::FormField;
use tokio::{net::TcpListener, sync::Mutex};

const BOTH_RESULTS: &str = r#"{"logistic_regression":"Approved","decision_tree":"Rejected"}"#;

#[derive(Debug, Clone)]
struct CapturedRequest {
    content_type: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct ServiceState {
    status: StatusCode,
    body: &'static str,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

async fn handle_predict(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state
        .captured
        .lock()
        .await
        .push(CapturedRequest { content_type, body });
    (state.status, state.body)
}

async fn spawn_prediction_service(
    status: StatusCode,
    body: &'static str,
) -> Result<(String, Arc<Mutex<Vec<CapturedRequest>>>)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let captured = Arc::new(Mutex::new(Vec::new()));
    let state = ServiceState {
        status,
        body,
        captured: Arc::clone(&captured),
    };
    let app = Router::new()
        .route("/api/predict", post(handle_predict))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), captured))
}

fn orchestrator_for(origin: String) -> PredictionOrchestrator {
    PredictionOrchestrator::new(OrchestratorConfig {
        origin: Some(origin),
        ..OrchestratorConfig::default()
    })
    .expect("orchestrator")
}

fn failed_message(state: &RequestState) -> &str {
    match state {
        RequestState::Failed { message, .. } => message,
        other => panic!("expected failed state, got {other:?}"),
    }
}

#[tokio::test]
async fn logistic_selection_surfaces_logistic_result() {
    let (origin, _captured) = spawn_prediction_service(StatusCode::OK, BOTH_RESULTS)
        .await
        .expect("spawn service");
    let orchestrator = orchestrator_for(origin);

    let state = orchestrator
        .predict(&FormState::default(), ModelSelection::Logistic)
        .await;

    assert_eq!(
        state,
        RequestState::Succeeded {
            selection: ModelSelection::Logistic,
            result: "Approved".into(),
        }
    );
    assert_eq!(orchestrator.current_state(), state);
}

#[tokio::test]
async fn tree_selection_surfaces_tree_result() {
    let (origin, _captured) = spawn_prediction_service(StatusCode::OK, BOTH_RESULTS)
        .await
        .expect("spawn service");
    let orchestrator = orchestrator_for(origin);

    let state = orchestrator
        .predict(&FormState::default(), ModelSelection::Tree)
        .await;

    assert_eq!(
        state,
        RequestState::Succeeded {
            selection: ModelSelection::Tree,
            result: "Rejected".into(),
        }
    );
}

#[tokio::test]
async fn posts_coerced_payload_as_json() {
    let (origin, captured) = spawn_prediction_service(StatusCode::OK, BOTH_RESULTS)
        .await
        .expect("spawn service");
    let orchestrator = orchestrator_for(origin);

    let mut form = FormState::default();
    form.set(FormField::ApplicantIncome, "4583");
    form.set(FormField::LoanAmountTerm, "");
    orchestrator.predict(&form, ModelSelection::Logistic).await;

    let captured = captured.lock().await;
    assert_eq!(captured.len(), 1, "exactly one request per invocation");
    let request = &captured[0];
    assert!(request
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("application/json")));

    let body = request.body.as_object().expect("json object body");
    assert_eq!(body.len(), 11);
    assert_eq!(body["ApplicantIncome"].as_f64(), Some(4583.0));
    assert_eq!(body["CoapplicantIncome"].as_f64(), Some(0.0));
    assert_eq!(body["Loan_Amount_Term"].as_f64(), Some(360.0));
    assert_eq!(body["Credit_History"].as_f64(), Some(1.0));
    assert_eq!(body["Self_Employed"], "No");
}

#[tokio::test]
async fn failure_status_reports_service_error_text() {
    let (origin, _captured) = spawn_prediction_service(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"error":"model unavailable"}"#,
    )
    .await
    .expect("spawn service");
    let orchestrator = orchestrator_for(origin);

    let state = orchestrator
        .predict(&FormState::default(), ModelSelection::Logistic)
        .await;

    assert_eq!(
        state,
        RequestState::Failed {
            selection: ModelSelection::Logistic,
            message: "model unavailable".into(),
        }
    );
}

#[tokio::test]
async fn failure_status_without_json_reports_code() {
    let (origin, _captured) =
        spawn_prediction_service(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            .await
            .expect("spawn service");
    let orchestrator = orchestrator_for(origin);

    let state = orchestrator
        .predict(&FormState::default(), ModelSelection::Tree)
        .await;

    assert_eq!(failed_message(&state), "request failed with status 500");
}

#[tokio::test]
async fn non_json_body_is_echoed_in_failure() {
    let (origin, _captured) = spawn_prediction_service(StatusCode::OK, "not json")
        .await
        .expect("spawn service");
    let orchestrator = orchestrator_for(origin);

    let state = orchestrator
        .predict(&FormState::default(), ModelSelection::Logistic)
        .await;

    assert!(failed_message(&state).contains("not json"));
}

#[tokio::test]
async fn business_error_on_ok_status_fails() {
    let (origin, _captured) =
        spawn_prediction_service(StatusCode::OK, r#"{"error":"could not convert features"}"#)
            .await
            .expect("spawn service");
    let orchestrator = orchestrator_for(origin);

    let state = orchestrator
        .predict(&FormState::default(), ModelSelection::Tree)
        .await;

    assert_eq!(failed_message(&state), "could not convert features");
}

#[tokio::test]
async fn missing_result_field_is_a_schema_failure_for_both_selections() {
    let (origin, _captured) =
        spawn_prediction_service(StatusCode::OK, r#"{"logistic_regression":"Approved"}"#)
            .await
            .expect("spawn service");
    let orchestrator = orchestrator_for(origin);

    for selection in [ModelSelection::Logistic, ModelSelection::Tree] {
        let state = orchestrator.predict(&FormState::default(), selection).await;
        assert_eq!(
            state,
            RequestState::Failed {
                selection,
                message: "invalid response format".into(),
            }
        );
    }
}

#[tokio::test]
async fn unreachable_service_reports_transport_failure() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let orchestrator = orchestrator_for(format!("http://{addr}"));
    let state = orchestrator
        .predict(&FormState::default(), ModelSelection::Logistic)
        .await;

    assert_eq!(
        failed_message(&state),
        "could not reach the prediction service"
    );
}

#[tokio::test]
async fn subscribers_observe_loading_then_settled() {
    let (origin, _captured) = spawn_prediction_service(StatusCode::OK, BOTH_RESULTS)
        .await
        .expect("spawn service");
    let orchestrator = Arc::new(orchestrator_for(origin));
    let mut rx = orchestrator.subscribe();
    assert_eq!(*rx.borrow_and_update(), RequestState::Idle);

    let handle = orchestrator.dispatch(FormState::default(), ModelSelection::Tree);
    let settled = handle.await.expect("join");

    assert!(settled.is_settled());
    assert_eq!(*rx.borrow_and_update(), settled);
    assert_eq!(settled.selection(), Some(ModelSelection::Tree));
}

#[test]
fn construction_rejects_relative_endpoint_without_origin() {
    let err = PredictionOrchestrator::new(OrchestratorConfig::default())
        .err()
        .expect("must fail");
    assert!(matches!(err, ConfigError::MissingOrigin { .. }));
}
