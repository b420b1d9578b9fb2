use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use tracing::{debug, error, info};

use crate::storage::{StorageError, UsageRow};

use super::types::{
    CreateUsageRequest, CreateUsageResponse, ErrorResponse, FeedbackRequest, FeedbackResponse,
    UpsertUsageRequest, UsageHistoryResponse,
};
use super::ApiState;

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn get_usage(
    State(state): State<Arc<ApiState>>,
    Path((device_id, day)): Path<(String, NaiveDate)>,
) -> ApiResult<UsageRow> {
    validate_device_id(&device_id)?;

    match state.database.fetch_usage(&device_id, day) {
        Ok(Some(row)) => Ok(Json(row)),
        Ok(None) => Err(not_found("usage_not_found", "no usage row for device and day")),
        Err(err) => Err(internal_error(err)),
    }
}

pub async fn create_usage(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<CreateUsageRequest>,
) -> Result<(StatusCode, Json<CreateUsageResponse>), ApiError> {
    validate_device_id(&request.device_id)?;

    let created = state
        .database
        .insert_usage_if_absent(&request.device_id, request.day)
        .map_err(internal_error)?;
    let usage = state
        .database
        .fetch_usage(&request.device_id, request.day)
        .map_err(internal_error)?
        .ok_or_else(|| internal_error("usage row missing after insert"))?;

    debug!(
        device_id = %request.device_id,
        day = %request.day,
        created,
        "daily usage row initialised"
    );

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(CreateUsageResponse { created, usage })))
}

pub async fn upsert_usage(
    State(state): State<Arc<ApiState>>,
    Path((device_id, day)): Path<(String, NaiveDate)>,
    Json(request): Json<UpsertUsageRequest>,
) -> ApiResult<UsageRow> {
    validate_device_id(&device_id)?;

    let row = state
        .database
        .upsert_usage(&device_id, day, request.count)
        .map_err(internal_error)?;

    debug!(device_id = %device_id, day = %day, count = row.count, "daily usage stored");
    Ok(Json(row))
}

pub async fn list_usage(
    State(state): State<Arc<ApiState>>,
    Path(device_id): Path<String>,
) -> ApiResult<UsageHistoryResponse> {
    validate_device_id(&device_id)?;

    let usage = state
        .database
        .list_device_usage(&device_id)
        .map_err(internal_error)?;

    Ok(Json(UsageHistoryResponse { device_id, usage }))
}

pub async fn submit_feedback(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackResponse>), ApiError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(bad_request("invalid_message", "message cannot be empty"));
    }
    if message.chars().count() > state.config.max_feedback_length {
        return Err(bad_request("message_too_long", "message exceeds maximum length"));
    }

    let device_id = request
        .device_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    let record = state
        .database
        .insert_feedback(device_id, message)
        .map_err(|err| match err {
            StorageError::InvalidValue(reason) => bad_request("invalid_message", &reason),
            other => internal_error(other),
        })?;

    info!(feedback_id = record.id, has_device = device_id.is_some(), "feedback stored");

    Ok((
        StatusCode::CREATED,
        Json(FeedbackResponse {
            id: record.id,
            created_at: record.created_at,
        }),
    ))
}

pub async fn health_check() -> ApiResult<serde_json::Value> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": "usage-store"
    })))
}

fn validate_device_id(device_id: &str) -> Result<(), ApiError> {
    if device_id.trim().is_empty() {
        return Err(bad_request("invalid_device_id", "device_id cannot be empty"));
    }
    Ok(())
}

fn bad_request(code: &str, message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            code: code.to_string(),
            details: None,
        }),
    )
}

fn not_found(code: &str, message: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.to_string(),
            code: code.to_string(),
            details: None,
        }),
    )
}

fn internal_error<E: std::fmt::Display>(err: E) -> ApiError {
    error!(error = %err, "usage store API internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal server error".to_string(),
            code: "internal_error".to_string(),
            details: Some(serde_json::json!({ "message": err.to_string() })),
        }),
    )
}
