//! Response types for the compensation engine API.
//!
//! This module defines the error response structures, the engine-error
//! to HTTP mapping, and the batch result envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::engine::BatchEntry;
use crate::error::{EngineError, StoreError};
use crate::models::TeacherSalaryBreakdown;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::ControllerConfigNotFound { date } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("No controller earnings version is effective on {}", date),
                ),
            },
            EngineError::TeacherNotFound { teacher_id } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::with_details(
                    "TEACHER_NOT_FOUND",
                    format!("Teacher not found: {}", teacher_id),
                    "The teacher id is not known to the data store",
                ),
            },
            EngineError::ControllerNotFound { controller_id } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::with_details(
                    "CONTROLLER_NOT_FOUND",
                    format!("Controller not found: {}", controller_id),
                    "The controller id is not known to the data store",
                ),
            },
            EngineError::ValidationError { field, message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "VALIDATION_ERROR",
                    format!("Invalid value for '{}'", field),
                    message,
                ),
            },
            EngineError::WaiverConflict { attempts } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "WAIVER_CONFLICT",
                    "Concurrent waiver requests kept conflicting",
                    format!("Gave up after {} attempts; retry the waiver", attempts),
                ),
            },
            EngineError::CalculationError { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CALCULATION_ERROR",
                    "Calculation failed",
                    message,
                ),
            },
            EngineError::Store(StoreError::Unavailable { message }) => ApiErrorResponse {
                status: StatusCode::SERVICE_UNAVAILABLE,
                error: ApiError::with_details(
                    "STORE_UNAVAILABLE",
                    "Data store unavailable",
                    message,
                ),
            },
            EngineError::Store(StoreError::Conflict { message }) => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "STORE_CONFLICT",
                    "Concurrent write conflict",
                    message,
                ),
            },
        }
    }
}

/// One teacher's slot in a batch salary response.
///
/// Exactly one of `breakdown` and `error` is present; a failed teacher
/// never hides the successful ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntryResponse {
    /// The teacher this slot belongs to.
    pub teacher_id: String,
    /// The computed breakdown, when the computation succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<TeacherSalaryBreakdown>,
    /// The per-teacher error, when it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl From<BatchEntry> for BatchEntryResponse {
    fn from(entry: BatchEntry) -> Self {
        match entry.outcome {
            Ok(breakdown) => BatchEntryResponse {
                teacher_id: entry.teacher_id,
                breakdown: Some(breakdown),
                error: None,
            },
            Err(err) => BatchEntryResponse {
                teacher_id: entry.teacher_id,
                breakdown: None,
                error: Some(ApiErrorResponse::from(err).error),
            },
        }
    }
}
