use serde::{Deserialize, Serialize};

/// Failure categories a prediction invocation can settle with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    Timeout,
    HttpStatus,
    Parse,
    Business,
    Schema,
}
