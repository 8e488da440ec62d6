//! HTTP request handlers for the compensation engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::Period;

use super::request::{
    BatchSalaryRequest, ControllerEarningsRequest, PaymentStatusRequest, SalaryRequest,
    WaiverApplyRequest, WaiverPreviewRequest,
};
use super::response::{ApiError, ApiErrorResponse, BatchEntryResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/salary", post(salary_handler))
        .route("/salary/batch", post(batch_salary_handler))
        .route("/controller-earnings", post(controller_earnings_handler))
        .route("/waivers/preview", post(waiver_preview_handler))
        .route("/waivers/apply", post(waiver_apply_handler))
        .route("/payment-status", put(payment_status_handler))
        .with_state(state)
}

/// Serializes a success body with an explicit JSON content type.
fn json_ok<T: Serialize>(body: T) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Maps an engine failure onto the error contract, logging it once.
fn engine_error_response(correlation_id: Uuid, error: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %error,
        "Request failed"
    );
    let api_error: ApiErrorResponse = error.into();
    (
        api_error.status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(api_error.error),
    )
        .into_response()
}

/// Maps a JSON extraction failure onto a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            // Check if it's a missing field error
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "application/json")],
        Json(error),
    )
        .into_response()
}

/// Handler for POST /salary.
///
/// Computes one teacher's salary breakdown over a date window.
async fn salary_handler(
    State(state): State<AppState>,
    payload: Result<Json<SalaryRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing salary request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match state
        .engine()
        .compute_teacher_salary(&request.teacher_id, request.from, request.to)
    {
        Ok(breakdown) => {
            info!(
                correlation_id = %correlation_id,
                teacher_id = %breakdown.teacher_id,
                days_taught = breakdown.summary.days_taught,
                net_salary = %breakdown.summary.net_salary,
                duration_us = start_time.elapsed().as_micros(),
                "Salary computed"
            );
            json_ok(breakdown)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /salary/batch.
///
/// Computes many teachers concurrently; per-teacher failures come back
/// inside the body instead of failing the whole request.
async fn batch_salary_handler(
    State(state): State<AppState>,
    payload: Result<Json<BatchSalaryRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing batch salary request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    let entries = state
        .engine()
        .compute_teacher_salaries(&request.teacher_ids, request.from, request.to)
        .await;
    let results: Vec<BatchEntryResponse> = entries.into_iter().map(Into::into).collect();
    let failed = results.iter().filter(|entry| entry.error.is_some()).count();
    info!(
        correlation_id = %correlation_id,
        teachers = results.len(),
        failed,
        duration_us = start_time.elapsed().as_micros(),
        "Batch salary computed"
    );
    json_ok(results)
}

/// Handler for POST /controller-earnings.
///
/// Computes earnings for one controller, or for every controller when
/// no id is given.
async fn controller_earnings_handler(
    State(state): State<AppState>,
    payload: Result<Json<ControllerEarningsRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing controller earnings request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let period = match request.period.parse::<Period>() {
        Ok(period) => period,
        Err(err) => return engine_error_response(correlation_id, err),
    };

    let start_time = Instant::now();
    let outcome = match request.controller_id.as_deref() {
        Some(id) => state.engine().compute_controller_earnings(period, Some(id)),
        None => state.engine().compute_all_controller_earnings(period).await,
    };
    match outcome {
        Ok(earnings) => {
            info!(
                correlation_id = %correlation_id,
                period = %period,
                controllers = earnings.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Controller earnings computed"
            );
            json_ok(earnings)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /waivers/preview.
///
/// Dry-runs a waiver filter; nothing is mutated.
async fn waiver_preview_handler(
    State(state): State<AppState>,
    payload: Result<Json<WaiverPreviewRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing waiver preview request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match state.engine().preview_waiver(request.into()) {
        Ok(preview) => {
            info!(
                correlation_id = %correlation_id,
                records_matched = preview.records_matched,
                amount_waivable = %preview.amount_waivable,
                "Waiver previewed"
            );
            json_ok(preview)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /waivers/apply.
///
/// Commits a waiver; requires a non-empty reason.
async fn waiver_apply_handler(
    State(state): State<AppState>,
    payload: Result<Json<WaiverApplyRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing waiver apply request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let (filter, reason) = request.into_parts();
    match state.engine().apply_waiver(filter, &reason) {
        Ok(receipt) => {
            info!(
                correlation_id = %correlation_id,
                audit_id = %receipt.audit_id,
                records_affected = receipt.records_affected,
                amount_waived = %receipt.amount_waived,
                "Waiver applied"
            );
            json_ok(receipt)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for PUT /payment-status.
///
/// Upserts the paid/unpaid row for one teacher and period.
async fn payment_status_handler(
    State(state): State<AppState>,
    payload: Result<Json<PaymentStatusRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payment status request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let period = match request.period.parse::<Period>() {
        Ok(period) => period,
        Err(err) => return engine_error_response(correlation_id, err),
    };

    match state
        .engine()
        .set_payment_status(&request.teacher_id, period, request.status)
    {
        Ok(payment) => json_ok(payment),
        Err(err) => engine_error_response(correlation_id, err),
    }
}
