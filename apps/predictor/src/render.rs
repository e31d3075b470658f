//! Text rendering of the orchestrator's visible state.

use shared::domain::RequestState;

pub fn render(state: &RequestState) -> Option<String> {
    match state {
        RequestState::Idle => None,
        RequestState::Loading { .. } => Some("Predicting...".to_string()),
        RequestState::Succeeded { selection, result } => Some(format!(
            "Prediction Result\n{}: {result}",
            selection.label()
        )),
        RequestState::Failed { selection, message } => {
            Some(format!("{} failed: {message}", selection.label()))
        }
    }
}
