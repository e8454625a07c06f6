//! # Maintenance API Handlers
//!
//! This module contains handlers for the out-of-order workflow: declaring a
//! room out of order, returning it to service and listing its tickets.

use crate::auth::{ActorExtension, OperatorAuth, TenantExtension, TenantHeader};
use crate::error::{ApiError, validation_error};
use crate::handlers::parse_rfc3339;
use crate::handlers::rooms::RoomInfo;
use crate::models::maintenance_ticket::{self, TicketStatus};
use crate::repositories::{MaintenanceTicketRepository, RoomRepository};
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maintenance ticket information response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TicketInfo {
    /// Unique identifier for the ticket
    pub id: Uuid,
    /// Room the ticket removes from service
    pub room_id: Uuid,
    /// Current ticket state
    pub status: TicketStatus,
    /// Why the room was taken out of service
    pub description: String,
    /// Expected return to service (RFC 3339); absent means indefinite
    pub due_at: Option<String>,
    /// Timestamp when the ticket was opened (RFC 3339)
    pub opened_at: String,
    /// Timestamp when the ticket was closed (RFC 3339)
    pub closed_at: Option<String>,
}

impl From<maintenance_ticket::Model> for TicketInfo {
    fn from(model: maintenance_ticket::Model) -> Self {
        Self {
            id: model.id,
            room_id: model.room_id,
            status: model.status,
            description: model.description,
            due_at: model.due_at.map(|dt| dt.to_rfc3339()),
            opened_at: model.opened_at.to_rfc3339(),
            closed_at: model.closed_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// Request payload for declaring a room out of order
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeclareOutOfOrderRequest {
    /// Why the room is being removed from service
    #[schema(example = "AC broken")]
    pub reason: String,
    /// Expected return to service (RFC 3339); omit for indefinite
    pub eta: Option<String>,
}

/// Response payload for an out-of-order declaration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OutOfOrderResponse {
    pub room: RoomInfo,
    pub ticket: TicketInfo,
}

/// Remove a room from the bookable pool, opening a maintenance ticket
#[utoipa::path(
    post,
    path = "/api/v1/rooms/{room_id}/out-of-order",
    security(("bearer_auth" = [])),
    params(
        TenantHeader,
        ("room_id" = Uuid, Path, description = "Room identifier")
    ),
    request_body = DeclareOutOfOrderRequest,
    responses(
        (status = 200, description = "Room taken out of order", body = OutOfOrderResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "Room not found", body = ApiError)
    ),
    tag = "maintenance"
)]
pub async fn declare_out_of_order(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    ActorExtension(actor): ActorExtension,
    Path(room_id): Path<Uuid>,
    Json(request): Json<DeclareOutOfOrderRequest>,
) -> Result<Json<OutOfOrderResponse>, ApiError> {
    let reason = request.reason.trim();
    if reason.is_empty() {
        return Err(validation_error(
            "Reason is required",
            serde_json::json!({ "reason": "Must not be empty" }),
        ));
    }

    let eta = request
        .eta
        .as_deref()
        .map(|v| parse_rfc3339("eta", v))
        .transpose()?;

    let outcome = state
        .lifecycle
        .declare_out_of_order(tenant, &actor, room_id, reason, eta, Utc::now())
        .await?;

    Ok(Json(OutOfOrderResponse {
        room: RoomInfo::from_model(outcome.room, None),
        ticket: TicketInfo::from(outcome.ticket),
    }))
}

/// Return an out-of-order room to service, closing its open tickets
#[utoipa::path(
    post,
    path = "/api/v1/rooms/{room_id}/return-to-service",
    security(("bearer_auth" = [])),
    params(
        TenantHeader,
        ("room_id" = Uuid, Path, description = "Room identifier")
    ),
    responses(
        (status = 200, description = "Room returned to service", body = RoomInfo),
        (status = 404, description = "Room not found", body = ApiError),
        (status = 409, description = "A booking currently holds the room", body = ApiError)
    ),
    tag = "maintenance"
)]
pub async fn return_to_service(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    ActorExtension(actor): ActorExtension,
    Path(room_id): Path<Uuid>,
) -> Result<Json<RoomInfo>, ApiError> {
    let updated = state
        .lifecycle
        .return_to_service(tenant, &actor, room_id, Utc::now())
        .await?;

    Ok(Json(RoomInfo::from_model(updated, None)))
}

/// List maintenance tickets for a room, newest first
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{room_id}/tickets",
    security(("bearer_auth" = [])),
    params(
        TenantHeader,
        ("room_id" = Uuid, Path, description = "Room identifier")
    ),
    responses(
        (status = 200, description = "Tickets for the room", body = Vec<TicketInfo>),
        (status = 404, description = "Room not found", body = ApiError)
    ),
    tag = "maintenance"
)]
pub async fn list_tickets(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Path(room_id): Path<Uuid>,
) -> Result<Json<Vec<TicketInfo>>, ApiError> {
    let room = RoomRepository::new(&state.db)
        .find_by_tenant(tenant, room_id)
        .await?;
    if room.is_none() {
        return Err(crate::error::OpsError::NotFound { resource: "room" }.into());
    }

    let tickets = MaintenanceTicketRepository::new(&state.db)
        .list_for_room(tenant, room_id)
        .await?;

    Ok(Json(tickets.into_iter().map(TicketInfo::from).collect()))
}
