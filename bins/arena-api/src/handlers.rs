// HTTP route handlers for the judge API

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use arena_common::types::{AssembledProgram, Language, SubmissionRecord, TestCase};
use arena_judge::sandbox::ExecutionRequest;
use arena_judge::{compare, AssembleError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::metrics;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembleRequest {
    pub language: String,
    pub user_code: String,
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub entry_point: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssembleResponse {
    pub program: AssembledProgram,
    /// Absent when the language has no runtime configured
    pub request: Option<ExecutionRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub language: String,
    pub captured_stdout: String,
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub memory_used_bytes: u64,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// POST /assemble - Build the driver program for a submission
pub async fn assemble_program(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AssembleRequest>,
) -> Response {
    let entry_point = payload
        .entry_point
        .as_deref()
        .unwrap_or_else(|| state.assembler.entry_point());

    let program = match state.assembler.assemble_as(
        entry_point,
        &payload.language,
        &payload.user_code,
        &payload.test_cases,
    ) {
        Ok(program) => program,
        Err(e) => {
            metrics::ASSEMBLE_ERRORS_TOTAL.inc();
            let status = match e {
                AssembleError::UnsupportedLanguage(_) => StatusCode::BAD_REQUEST,
                AssembleError::Template(_) | AssembleError::Render(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            };
            warn!(language = %payload.language, error = %e, "Assembly rejected");
            return error_response(status, e.to_string());
        }
    };

    metrics::ASSEMBLIES_TOTAL
        .with_label_values(&[program.language.tag()])
        .inc();

    let request = state
        .languages
        .get_config(program.language)
        .ok()
        .map(|config| ExecutionRequest::for_program(&program, config));

    info!(
        language = %program.language,
        test_cases = payload.test_cases.len(),
        source_size = program.source_text.len(),
        "Program assembled"
    );

    (
        StatusCode::CREATED,
        Json(AssembleResponse { program, request }),
    )
        .into_response()
}

/// POST /compare - Turn captured sandbox stdout into a submission record
pub async fn compare_output(
    State(_state): State<Arc<AppState>>,
    Json(payload): Json<CompareRequest>,
) -> Response {
    let Some(language) = Language::from_alias(&payload.language) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("unsupported language: {}", payload.language),
        );
    };

    let verdict = compare(
        &payload.captured_stdout,
        &payload.test_cases,
        payload.memory_used_bytes,
    );

    for outcome in &verdict.per_test_case {
        metrics::OBSERVED_TIME_MS.observe(outcome.observed_time_ms as f64);
    }
    metrics::VERDICTS_TOTAL
        .with_label_values(&[verdict.overall_status.to_string().as_str()])
        .inc();

    let record = SubmissionRecord::new(language, verdict);

    info!(
        submission_id = %record.submission_id,
        language = %language,
        status = %record.verdict.overall_status,
        passed = record.test_cases_passed,
        total = record.total_test_cases,
        "Submission evaluated"
    );

    (StatusCode::OK, Json(record)).into_response()
}

/// GET /status - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus scrape endpoint
pub async fn metrics() -> Response {
    match metrics::render() {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}
