//! # KPI API Handlers
//!
//! This module contains the read-only KPI snapshot endpoint.

use crate::auth::{OperatorAuth, TenantExtension, TenantHeader};
use crate::error::{ApiError, validation_error};
use crate::kpi::{KpiSnapshot, KpiWindow};
use crate::server::AppState;
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;

/// Query parameters for the KPI endpoint
#[derive(Debug, Deserialize)]
pub struct KpiQuery {
    /// Window for the averages (today, last_7_days, month_to_date)
    pub window: Option<String>,
}

/// Occupancy and revenue KPIs for the tenant
#[utoipa::path(
    get,
    path = "/api/v1/kpis",
    security(("bearer_auth" = [])),
    params(
        TenantHeader,
        ("window" = Option<String>, Query, description = "Averaging window: today, last_7_days, month_to_date (default today)")
    ),
    responses(
        (status = 200, description = "KPI snapshot", body = KpiSnapshot),
        (status = 400, description = "Invalid window", body = ApiError)
    ),
    tag = "kpis"
)]
pub async fn get_kpis(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Query(params): Query<KpiQuery>,
) -> Result<Json<KpiSnapshot>, ApiError> {
    let window = match params.window.as_deref() {
        None => KpiWindow::Today,
        Some(value) => KpiWindow::parse(value).ok_or_else(|| {
            validation_error(
                "Invalid window",
                serde_json::json!({
                    "window": "Must be one of: today, last_7_days, month_to_date"
                }),
            )
        })?,
    };

    let snapshot = state.kpis.snapshot(tenant, window, Utc::now()).await?;

    Ok(Json(snapshot))
}
