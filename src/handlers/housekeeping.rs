//! # Housekeeping API Handlers
//!
//! This module contains handlers for turnover task listing and completion.

use crate::auth::{ActorExtension, OperatorAuth, TenantExtension, TenantHeader};
use crate::error::{ApiError, validation_error};
use crate::models::housekeeping_task::{self, TaskStatus};
use crate::repositories::HousekeepingTaskRepository;
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Housekeeping task information response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskInfo {
    /// Unique identifier for the task
    pub id: Uuid,
    /// Room being turned over
    pub room_id: Uuid,
    /// Booking whose checkout created the task
    pub booking_id: Option<Uuid>,
    /// Current task state
    pub status: TaskStatus,
    /// Checklist items for the turnover
    pub checklist: Option<serde_json::Value>,
    /// Timestamp when the task was created (RFC 3339)
    pub started_at: String,
    /// Timestamp when the task was completed (RFC 3339)
    pub completed_at: Option<String>,
}

impl From<housekeeping_task::Model> for TaskInfo {
    fn from(model: housekeeping_task::Model) -> Self {
        Self {
            id: model.id,
            room_id: model.room_id,
            booking_id: model.booking_id,
            status: model.status,
            checklist: model.checklist,
            started_at: model.started_at.to_rfc3339(),
            completed_at: model.completed_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// Query parameters for listing housekeeping tasks
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// Filter by task status (IN_PROGRESS or CLEAN)
    pub status: Option<String>,
}

/// List housekeeping tasks for the tenant, newest first
#[utoipa::path(
    get,
    path = "/api/v1/housekeeping-tasks",
    security(("bearer_auth" = [])),
    params(
        TenantHeader,
        ("status" = Option<String>, Query, description = "Filter by status (IN_PROGRESS, CLEAN)")
    ),
    responses(
        (status = 200, description = "Tasks for the tenant", body = Vec<TaskInfo>),
        (status = 400, description = "Invalid status filter", body = ApiError)
    ),
    tag = "housekeeping"
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Query(params): Query<ListTasksQuery>,
) -> Result<Json<Vec<TaskInfo>>, ApiError> {
    let status = match params.status.as_deref() {
        None => None,
        Some("IN_PROGRESS") => Some(TaskStatus::InProgress),
        Some("CLEAN") => Some(TaskStatus::Clean),
        Some(_) => {
            return Err(validation_error(
                "Invalid status",
                serde_json::json!({ "status": "Must be one of: IN_PROGRESS, CLEAN" }),
            ));
        }
    };

    let tasks = HousekeepingTaskRepository::new(&state.db)
        .list_by_tenant(tenant, status)
        .await?;

    Ok(Json(tasks.into_iter().map(TaskInfo::from).collect()))
}

/// Complete a turnover task, returning the room to the bookable pool
#[utoipa::path(
    post,
    path = "/api/v1/housekeeping-tasks/{task_id}/complete",
    security(("bearer_auth" = [])),
    params(
        TenantHeader,
        ("task_id" = Uuid, Path, description = "Task identifier")
    ),
    responses(
        (status = 200, description = "Task completed", body = TaskInfo),
        (status = 404, description = "Task not found", body = ApiError),
        (status = 409, description = "Task already completed", body = ApiError)
    ),
    tag = "housekeeping"
)]
pub async fn complete_task(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    ActorExtension(actor): ActorExtension,
    Path(task_id): Path<Uuid>,
) -> Result<Json<TaskInfo>, ApiError> {
    let updated = state
        .lifecycle
        .complete_housekeeping(tenant, &actor, task_id, Utc::now())
        .await?;

    Ok(Json(TaskInfo::from(updated)))
}
