//! HTTP API data models

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tripcrew_core::api::{split_list, ErrorCode, ExecutionResult, PipelineError, ValidationError};

// ============= Plan =============

/// A list field given either as a JSON array or as one comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ListField {
    List(Vec<String>),
    Text(String),
}

impl Default for ListField {
    fn default() -> Self {
        ListField::List(Vec::new())
    }
}

impl ListField {
    pub fn into_items(self) -> Vec<String> {
        match self {
            ListField::List(items) => items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            ListField::Text(raw) => split_list(&raw),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub cities: ListField,
    #[serde(default, alias = "dateRange")]
    pub date_range: String,
    #[serde(default)]
    pub interests: ListField,
}

#[derive(Debug, Serialize)]
pub struct PlanData {
    pub run_id: String,
    pub final_output: String,
    pub results: Vec<ExecutionResult>,
    pub duration_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PlanData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

// ============= Health =============

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub session_id: String,
    pub uptime_seconds: f64,
    pub requests_handled: u64,
    pub plans_completed: u64,
    pub timestamp: String,
}

// ============= Error Handling =============

#[derive(Debug)]
pub enum HttpServerError {
    InvalidRequest(String),
    Validation(ValidationError),
    Pipeline(PipelineError),
    Internal(String),
}

impl From<ValidationError> for HttpServerError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<PipelineError> for HttpServerError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Validation(v) => Self::Validation(v),
            other => Self::Pipeline(other),
        }
    }
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let mut failed_task = None;
        let (status, error_code, message) = match self {
            Self::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg),
            Self::Validation(e) => (
                StatusCode::BAD_REQUEST,
                ErrorCode::ValidationError.as_str(),
                e.to_string(),
            ),
            Self::Pipeline(e) => {
                failed_task = e.failed_task().map(str::to_string);
                (StatusCode::BAD_GATEWAY, e.error_code().as_str(), e.to_string())
            }
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let mut body = serde_json::json!({
            "success": false,
            "error": message,
            "error_code": error_code,
        });
        if let Some(task) = failed_task {
            body["failed_task"] = serde_json::Value::String(task);
        }

        (status, Json(body)).into_response()
    }
}
