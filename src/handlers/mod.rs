//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the RoomOps API.

use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::db;
use crate::error::ApiError;
use crate::models::ServiceInfo;
use crate::server::AppState;

pub mod bookings;
pub mod housekeeping;
pub mod kpis;
pub mod maintenance;
pub mod rooms;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Readiness handler verifying database connectivity
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 503, description = "Database unreachable", body = ApiError)
    ),
    tag = "root"
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    db::health_check(&state.db).await?;
    Ok(Json(json!({ "status": "ok" })))
}

/// Parse an RFC 3339 timestamp from a request field, normalizing to UTC.
pub(crate) fn parse_rfc3339(field: &str, value: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            crate::error::validation_error(
                "Invalid timestamp",
                json!({ field: "Must be a valid RFC 3339 timestamp" }),
            )
        })
}
