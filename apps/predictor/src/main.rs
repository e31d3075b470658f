use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use client_core::PredictionOrchestrator;
use shared::domain::{FormField, ModelSelection, RequestState};
use tracing_subscriber::EnvFilter;

mod form;
mod render;
mod settings;

use form::{build_form, parse_field_assignment};
use render::render;
use settings::load_settings;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelChoice {
    Logistic,
    Tree,
    Both,
}

impl ModelChoice {
    fn selections(self) -> Vec<ModelSelection> {
        match self {
            ModelChoice::Logistic => vec![ModelSelection::Logistic],
            ModelChoice::Tree => vec![ModelSelection::Tree],
            ModelChoice::Both => vec![ModelSelection::Logistic, ModelSelection::Tree],
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Predict loan approval with a remote model service")]
struct Args {
    /// Prediction endpoint, absolute or relative to --origin.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    origin: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Model(s) to run; exits non-zero if any of them fails.
    #[arg(long, value_enum, default_value_t = ModelChoice::Both)]
    model: ModelChoice,
    /// JSON object keyed by form field names.
    #[arg(long)]
    form: Option<PathBuf>,
    /// Field edit as KEY=VALUE; repeatable.
    #[arg(long = "field", value_parser = parse_field_assignment)]
    fields: Vec<(FormField, String)>,
    /// Show whichever invocation settles last, even if superseded.
    #[arg(long)]
    allow_stale: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(v) = args.api_url {
        settings.api_url = v;
    }
    if let Some(v) = args.origin {
        settings.origin = Some(v);
    }
    if let Some(v) = args.timeout_secs {
        settings.request_timeout_secs = v;
    }
    if args.allow_stale {
        settings.suppress_stale = false;
    }

    let form = build_form(args.form.as_deref(), &args.fields)?;
    let orchestrator = Arc::new(
        PredictionOrchestrator::new(settings.orchestrator_config())
            .context("invalid prediction endpoint configuration")?,
    );
    tracing::info!(url = %orchestrator.endpoint(), "predictor: ready");

    let mut states = orchestrator.subscribe();
    let mut settled = Vec::new();
    for selection in args.model.selections() {
        let handle = orchestrator.dispatch(form.clone(), selection);
        loop {
            states
                .changed()
                .await
                .context("request state channel closed")?;
            let state = states.borrow_and_update().clone();
            if let Some(text) = render(&state) {
                println!("{text}");
            }
            if state.is_settled() {
                break;
            }
        }
        settled.push(handle.await.context("prediction task panicked")?);
    }

    Ok(if any_failed(&settled) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn any_failed(settled: &[RequestState]) -> bool {
    settled
        .iter()
        .any(|state| matches!(state, RequestState::Failed { .. }))
}
