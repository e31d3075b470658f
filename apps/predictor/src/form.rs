use std::{fs, path::Path};

use anyhow::{Context, Result};
use shared::domain::{FormField, FormState};

/// Parses a `--field KEY=VALUE` argument. The value may be empty.
pub fn parse_field_assignment(raw: &str) -> Result<(FormField, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let field = key.trim().parse::<FormField>().map_err(|e| e.to_string())?;
    Ok((field, value.to_string()))
}

/// Starts from the form file (or the default form) and applies field
/// edits in order.
pub fn build_form(path: Option<&Path>, edits: &[(FormField, String)]) -> Result<FormState> {
    let mut form = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read form file '{}'", path.display()))?;
            serde_json::from_str::<FormState>(&raw)
                .with_context(|| format!("invalid form file '{}'", path.display()))?
        }
        None => FormState::default(),
    };

    for (field, value) in edits {
        form.set(*field, value.as_str());
    }
    Ok(form)
}
