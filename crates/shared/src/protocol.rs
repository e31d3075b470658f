use serde_json::Value;

use crate::domain::ModelSelection;

pub const LOGISTIC_REGRESSION_FIELD: &str = "logistic_regression";
pub const DECISION_TREE_FIELD: &str = "decision_tree";
pub const ERROR_FIELD: &str = "error";

/// Response body of the prediction service, validated once at the parse
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionResponse {
    Success { logistic: String, tree: String },
    BusinessError { message: String },
    Malformed,
}

impl PredictionResponse {
    /// Classifies a parsed JSON body. A non-null, non-blank top-level
    /// `error` wins over any result fields.
    pub fn from_json(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::Malformed;
        };

        if let Some(message) = object.get(ERROR_FIELD).and_then(error_text) {
            return Self::BusinessError { message };
        }

        let logistic = object.get(LOGISTIC_REGRESSION_FIELD).and_then(result_text);
        let tree = object.get(DECISION_TREE_FIELD).and_then(result_text);
        match (logistic, tree) {
            (Some(logistic), Some(tree)) => Self::Success { logistic, tree },
            _ => Self::Malformed,
        }
    }

    pub fn result_for(&self, selection: ModelSelection) -> Option<&str> {
        match (self, selection) {
            (Self::Success { logistic, .. }, ModelSelection::Logistic) => Some(logistic.as_str()),
            (Self::Success { tree, .. }, ModelSelection::Tree) => Some(tree.as_str()),
            _ => None,
        }
    }
}

/// Text of an `error` indicator, if one is present. Blank strings count
/// as absent.
pub fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn result_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
