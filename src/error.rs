//! # Error Handling
//!
//! This module provides unified error handling for the RoomOps API,
//! implementing a consistent problem+json response format with trace ID
//! propagation, plus the domain error taxonomy used by admission control and
//! the booking lifecycle.

use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::booking::{self, BookingStatus};
use crate::models::room::RoomStatus;
use crate::telemetry;

/// Unified API error response structure
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    /// HTTP status code for the response
    #[serde(skip_serializing, skip_deserializing)]
    pub status: StatusCode,
    /// Error code for programmatic handling
    pub code: Box<str>,
    /// Human-readable error message
    pub message: Box<str>,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Box<serde_json::Value>>,
    /// Suggested retry delay in seconds (optional)
    pub retry_after: Option<u64>,
    /// Correlation trace ID for debugging (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Box<str>>,
}

impl ApiError {
    /// Create a new API error with the given status code and message
    pub fn new<S: Into<String>>(status: StatusCode, code: S, message: S) -> Self {
        Self {
            status,
            code: code.into().into_boxed_str(),
            message: message.into().into_boxed_str(),
            details: None,
            retry_after: None,
            trace_id: Self::current_trace_id(),
        }
    }

    /// Add details to the error
    pub fn with_details<V: Into<serde_json::Value>>(mut self, details: V) -> Self {
        self.details = Some(Box::new(details.into()));
        self
    }

    /// Set retry after delay
    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    /// Extract current trace ID from the active trace context (falls back to a
    /// generated correlation ID)
    fn current_trace_id() -> Option<Box<str>> {
        telemetry::current_trace_id()
            .map(|trace_id| trace_id.into_boxed_str())
            .or_else(|| {
                Some(format!("corr-{}", &Uuid::new_v4().to_string()[..8]).into_boxed_str())
            })
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            HeaderValue::from_static("application/problem+json"),
        );

        if let Some(retry_after) = self.retry_after
            && let Ok(header_value) = HeaderValue::from_str(&retry_after.to_string())
        {
            headers.insert("retry-after", header_value);
        }

        (self.status, headers, axum::Json(self)).into_response()
    }
}

/// One conflicting booking reported back to the caller when an admission is
/// rejected with `Overlap`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingConflict {
    /// Identifier of the conflicting booking
    pub id: Uuid,
    /// Start of the conflicting interval (RFC 3339)
    pub start_at: String,
    /// End of the conflicting interval (RFC 3339)
    pub end_at: String,
    /// Status of the conflicting booking
    pub status: BookingStatus,
}

impl From<&booking::Model> for BookingConflict {
    fn from(model: &booking::Model) -> Self {
        Self {
            id: model.id,
            start_at: model.start_at.to_rfc3339(),
            end_at: model.end_at.to_rfc3339(),
            status: model.status,
        }
    }
}

/// Domain errors raised by admission control and the lifecycle controller.
///
/// Every variant represents a business-rule violation detected before any
/// mutation, except `Unavailable` which surfaces a storage failure that
/// survived the single retry.
#[derive(Debug, Clone, Error)]
pub enum OpsError {
    #[error("invalid booking interval: {reason}")]
    InvalidInterval { reason: String },
    #[error("room is not available for this transition (current status {status:?})")]
    RoomUnavailable { status: RoomStatus },
    #[error("requested interval overlaps an existing booking")]
    Overlap { conflicts: Vec<BookingConflict> },
    #[error("room is out of order")]
    OutOfOrder { until: Option<DateTime<Utc>> },
    #[error("transition not allowed: expected {expected}, found {actual}")]
    WrongBookingState { expected: String, actual: String },
    #[error("check-in is only allowed between {opens_at} and {closes_at}")]
    OutsideCheckInWindow {
        opens_at: DateTime<Utc>,
        closes_at: DateTime<Utc>,
    },
    #[error("a booking currently holds this room")]
    ActiveBookingPresent,
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
    #[error("storage is temporarily unavailable")]
    Unavailable,
}

impl OpsError {
    /// HTTP status code the variant maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            OpsError::InvalidInterval { .. } => StatusCode::BAD_REQUEST,
            OpsError::NotFound { .. } => StatusCode::NOT_FOUND,
            OpsError::RoomUnavailable { .. }
            | OpsError::Overlap { .. }
            | OpsError::OutOfOrder { .. }
            | OpsError::WrongBookingState { .. }
            | OpsError::OutsideCheckInWindow { .. }
            | OpsError::ActiveBookingPresent => StatusCode::CONFLICT,
            OpsError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Stable error code (SCREAMING_SNAKE_CASE)
    pub fn error_code(&self) -> &'static str {
        match self {
            OpsError::InvalidInterval { .. } => "INVALID_INTERVAL",
            OpsError::RoomUnavailable { .. } => "ROOM_UNAVAILABLE",
            OpsError::Overlap { .. } => "OVERLAP",
            OpsError::OutOfOrder { .. } => "OUT_OF_ORDER",
            OpsError::WrongBookingState { .. } => "WRONG_BOOKING_STATE",
            OpsError::OutsideCheckInWindow { .. } => "OUTSIDE_CHECK_IN_WINDOW",
            OpsError::ActiveBookingPresent => "ACTIVE_BOOKING_PRESENT",
            OpsError::NotFound { .. } => "NOT_FOUND",
            OpsError::Unavailable => "SERVICE_UNAVAILABLE",
        }
    }
}

impl From<OpsError> for ApiError {
    fn from(error: OpsError) -> Self {
        let message = error.to_string();
        let api_error = ApiError::new(error.status_code(), error.error_code(), &message);

        match error {
            OpsError::Overlap { conflicts } => {
                api_error.with_details(json!({ "conflicts": conflicts }))
            }
            OpsError::OutOfOrder { until } => api_error.with_details(json!({
                "until": until.map(|dt| dt.to_rfc3339()),
            })),
            OpsError::OutsideCheckInWindow {
                opens_at,
                closes_at,
            } => api_error.with_details(json!({
                "opens_at": opens_at.to_rfc3339(),
                "closes_at": closes_at.to_rfc3339(),
            })),
            OpsError::WrongBookingState { expected, actual } => {
                api_error.with_details(json!({ "expected": expected, "actual": actual }))
            }
            OpsError::RoomUnavailable { status } => {
                api_error.with_details(json!({ "status": status }))
            }
            OpsError::InvalidInterval { reason } => {
                api_error.with_details(json!({ "reason": reason }))
            }
            OpsError::Unavailable => api_error.with_retry_after(1),
            _ => api_error,
        }
    }
}

fn is_unique_violation(error: &sea_orm::DbErr) -> bool {
    use sea_orm::RuntimeErr;

    const PG_UNIQUE: &str = "23505";
    const SQLITE_DUPLICATE_CODES: &[&str] = &["1555", "2067"];

    let runtime_err = match error {
        sea_orm::DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | sea_orm::DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err,
        _ => return false,
    };

    let Some(db_error) = runtime_err.as_database_error() else {
        return false;
    };

    if db_error.is_unique_violation() {
        return true;
    }

    if let Some(code) = db_error.code() {
        let code_str = code.as_ref();
        return code_str == PG_UNIQUE || SQLITE_DUPLICATE_CODES.contains(&code_str);
    }

    false
}

/// Classify storage errors that are worth one retry with a fresh transaction:
/// serialization conflicts, deadlocks and pool/lock contention.
pub fn is_transient(error: &sea_orm::DbErr) -> bool {
    if matches!(error, sea_orm::DbErr::ConnectionAcquire(_)) {
        return true;
    }

    let text = error.to_string();
    text.contains("could not serialize access")
        || text.contains("40001")
        || text.contains("deadlock detected")
        || text.contains("database is locked")
        || text.contains("database table is locked")
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(error: sea_orm::DbErr) -> Self {
        if is_unique_violation(&error) {
            tracing::debug!(?error, "Unique constraint violation detected");
            return Self::new(StatusCode::CONFLICT, "CONFLICT", "Resource already exists");
        }

        match error {
            sea_orm::DbErr::RecordNotFound(record) => Self::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                &format!("Record not found: {}", record),
            ),
            sea_orm::DbErr::Conn(connection_err) => {
                tracing::error!("Database connection error: {:?}", connection_err);
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Database service unavailable",
                )
            }
            other => {
                tracing::error!("Database error: {:?}", other);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Database error occurred",
                )
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        tracing::error!("Internal error: {:?}", error);

        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "An internal error occurred",
        )
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("JSON syntax error: {}", err),
            JsonRejection::MissingJsonContentType(_) => {
                "Missing 'Content-Type: application/json' header".to_string()
            }
            _ => "Invalid request body".to_string(),
        };

        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", &message)
    }
}

/// Create an unauthorized error (401)
pub fn unauthorized(message: Option<&str>) -> ApiError {
    let msg = message.unwrap_or("Authentication required");
    ApiError::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
}

/// Create an unauthorized error (401) with explicit trace_id
pub fn unauthorized_with_trace_id(message: Option<&str>, trace_id: String) -> ApiError {
    let msg = message.unwrap_or("Authentication required");
    let mut error = ApiError::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg);
    error.trace_id = Some(trace_id.into_boxed_str());
    error
}

/// Create a validation error with field details
pub fn validation_error(message: &str, field_errors: serde_json::Value) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message).with_details(field_errors)
}
