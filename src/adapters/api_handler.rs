//! REST API handlers
//!
//! JSON counterparts of the form pages: schema inspection, validation,
//! history management and remote submission.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::error;

use crate::adapters::form_handler::FormState;
use crate::adapters::remote::RemoteOutcome;
use crate::domain::{FieldKind, FieldSpec, FormEngine, FormOutcome, HistoryLog, Submission};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed request that still carries a payload, e.g. validation errors.
    pub fn failure(data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(message.into()),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FieldDto {
    pub name: String,
    pub kind: String,
    /// Declared `tipo` when the kind is not recognized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

impl From<&FieldSpec> for FieldDto {
    fn from(f: &FieldSpec) -> Self {
        let bounds = (f.kind == FieldKind::Number).then(|| f.bounds());
        let declared_kind = match &f.kind {
            FieldKind::Unknown(tag) => tag.clone(),
            _ => None,
        };
        Self {
            name: f.name.clone(),
            kind: f.kind.as_str().to_string(),
            declared_kind,
            placeholder: f.placeholder.clone(),
            regex: f.regex.clone(),
            min: bounds.map(|(min, _)| min),
            max: bounds.map(|(_, max)| max),
        }
    }
}

#[derive(Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub values: Map<String, Value>,
}

#[derive(Serialize)]
pub struct SubmitResult {
    pub submission: Submission,
    #[serde(flatten)]
    pub remote: RemoteOutcome,
    pub message: String,
}

fn collect(state: &FormState, values: &Map<String, Value>) -> FormOutcome {
    FormEngine::collect_json(&state.schema, values)
}

fn invalid(outcome: FormOutcome) -> (StatusCode, Json<ApiResponse<FormOutcome>>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::failure(outcome, "Form has validation errors")),
    )
}

// ============================================================================
// Schema & Validation
// ============================================================================

pub async fn get_schema(State(state): State<FormState>) -> impl IntoResponse {
    let fields: Vec<FieldDto> = state.schema.fields().map(FieldDto::from).collect();
    (StatusCode::OK, Json(ApiResponse::success(fields)))
}

pub async fn validate_form(
    State(state): State<FormState>,
    Json(values): Json<Map<String, Value>>,
) -> impl IntoResponse {
    let outcome = collect(&state, &values);
    (StatusCode::OK, Json(ApiResponse::success(outcome)))
}

// ============================================================================
// History
// ============================================================================

pub async fn list_history(State(state): State<FormState>) -> impl IntoResponse {
    match state.history.list().await {
        Ok(log) => (StatusCode::OK, Json(ApiResponse::success(log))),
        Err(e) => {
            error!("Failed to read history: {}", e);
            (
                e.status_code(),
                Json(ApiResponse::<HistoryLog>::error(e.to_string())),
            )
        }
    }
}

pub async fn create_history_entry(
    State(state): State<FormState>,
    Json(values): Json<Map<String, Value>>,
) -> axum::response::Response {
    let outcome = collect(&state, &values);
    if !outcome.is_valid() {
        return invalid(outcome).into_response();
    }

    match state.history.append(outcome.submission.clone()).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(outcome.submission)),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to save submission: {}", e);
            (
                e.status_code(),
                Json(ApiResponse::<Submission>::error(e.to_string())),
            )
                .into_response()
        }
    }
}

pub async fn delete_history_entry(
    State(state): State<FormState>,
    Path(index): Path<i64>,
) -> impl IntoResponse {
    let Ok(index) = usize::try_from(index) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Submission>::error("History entry not found")),
        );
    };

    match state.history.delete(index).await {
        Ok(Some(removed)) => (StatusCode::OK, Json(ApiResponse::success(removed))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Submission>::error("History entry not found")),
        ),
        Err(e) => {
            error!("Failed to delete history entry {}: {}", index, e);
            (
                e.status_code(),
                Json(ApiResponse::<Submission>::error(e.to_string())),
            )
        }
    }
}

// ============================================================================
// Remote Submission
// ============================================================================

pub async fn submit_remote(
    State(state): State<FormState>,
    Json(request): Json<SubmitRequest>,
) -> axum::response::Response {
    let outcome = collect(&state, &request.values);
    if !outcome.is_valid() {
        return invalid(outcome).into_response();
    }

    let remote = state.remote.submit(&request.url, &outcome.submission).await;
    let result = SubmitResult {
        message: remote.message(),
        submission: outcome.submission,
        remote,
    };

    // Remote failures are reported in the body, the request itself succeeded.
    let response = if result.remote.is_success() {
        ApiResponse::success(result)
    } else {
        let message = result.message.clone();
        ApiResponse::failure(result, message)
    };
    (StatusCode::OK, Json(response)).into_response()
}
