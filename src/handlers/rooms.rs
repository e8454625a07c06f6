//! # Rooms API Handlers
//!
//! This module contains handlers for room inventory management and the
//! read-only availability probe.

use crate::auth::{ActorExtension, OperatorAuth, TenantExtension, TenantHeader};
use crate::availability::{AvailabilityDecision, BookingInterval, check_availability};
use crate::error::{ApiError, BookingConflict, OpsError, validation_error};
use crate::handlers::parse_rfc3339;
use crate::models::booking;
use crate::models::room::{self, HousekeepingStatus, RoomStatus};
use crate::repositories::{BookingRepository, RoomRepository};
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Request payload for creating a room
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateRoomRequest {
    /// Room name, unique per tenant
    #[schema(example = "204")]
    pub name: String,
    /// Hourly rate used when bookings omit an explicit price
    #[schema(example = 120.0)]
    pub base_rate: Option<f64>,
}

/// Request payload for updating a room's descriptive fields
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateRoomRequest {
    /// New room name
    pub name: Option<String>,
    /// New base hourly rate
    pub base_rate: Option<f64>,
}

/// Summary of the booking currently holding a room
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CurrentBookingInfo {
    /// Identifier of the holding booking
    pub id: Uuid,
    /// Guest the room is held for
    pub guest_name: Option<String>,
    /// Who placed the booking
    pub booked_by: Option<String>,
    /// Start of the holding interval (RFC 3339)
    pub start_at: String,
    /// End of the holding interval (RFC 3339)
    pub end_at: String,
    /// Status of the holding booking
    pub status: booking::BookingStatus,
}

/// Room information response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoomInfo {
    /// Unique identifier for the room
    pub id: Uuid,
    /// Room name
    #[schema(example = "204")]
    pub name: String,
    /// Current operational status
    pub status: RoomStatus,
    /// Current turnover state
    pub housekeeping_status: HousekeepingStatus,
    /// True while the room is removed from the bookable pool
    pub out_of_order: bool,
    /// Hourly rate used for amount computation
    pub base_rate: f64,
    /// Timestamp of the last inspection (RFC 3339)
    pub inspected_at: Option<String>,
    /// Booking currently holding the room, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_booking: Option<CurrentBookingInfo>,
}

impl RoomInfo {
    pub(crate) fn from_model(model: room::Model, current: Option<&booking::Model>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            status: model.status,
            housekeeping_status: model.housekeeping_status,
            out_of_order: model.out_of_order,
            base_rate: model.base_rate,
            inspected_at: model.inspected_at.map(|dt| dt.to_rfc3339()),
            current_booking: current.map(|b| CurrentBookingInfo {
                id: b.id,
                guest_name: b.guest_name.clone(),
                booked_by: b.booked_by.clone(),
                start_at: b.start_at.to_rfc3339(),
                end_at: b.end_at.to_rfc3339(),
                status: b.status,
            }),
        }
    }
}

/// Query parameters for the availability probe
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Candidate interval start (RFC 3339)
    pub start: String,
    /// Candidate interval end (RFC 3339)
    pub end: String,
}

/// Availability probe response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityResponse {
    /// Whether the interval would be admitted
    pub available: bool,
    /// Rejection code when not available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Expected return to service for out-of-order rejections (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
    /// Conflicting bookings for overlap rejections (bounded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Vec<BookingConflict>>,
}

impl AvailabilityResponse {
    fn admitted() -> Self {
        Self {
            available: true,
            reason: None,
            until: None,
            conflicts: None,
        }
    }

    fn rejected(error: OpsError) -> Self {
        let reason = Some(error.error_code().to_string());
        match error {
            OpsError::OutOfOrder { until } => Self {
                available: false,
                reason,
                until: until.map(|dt| dt.to_rfc3339()),
                conflicts: None,
            },
            OpsError::Overlap { conflicts } => Self {
                available: false,
                reason,
                until: None,
                conflicts: Some(conflicts),
            },
            _ => Self {
                available: false,
                reason,
                until: None,
                conflicts: None,
            },
        }
    }
}

/// List all rooms for the tenant with their current holding booking
#[utoipa::path(
    get,
    path = "/api/v1/rooms",
    security(("bearer_auth" = [])),
    params(TenantHeader),
    responses(
        (status = 200, description = "Rooms for the tenant", body = Vec<RoomInfo>),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "rooms"
)]
pub async fn list_rooms(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
) -> Result<Json<Vec<RoomInfo>>, ApiError> {
    let now = Utc::now();

    let rooms = RoomRepository::new(&state.db).list_by_tenant(tenant).await?;
    let active = BookingRepository::new(&state.db)
        .list_active_holding_by_tenant(tenant, now)
        .await?;

    let infos = rooms
        .into_iter()
        .map(|r| {
            let current = active.iter().find(|b| b.room_id == r.id);
            RoomInfo::from_model(r, current)
        })
        .collect();

    Ok(Json(infos))
}

/// Create a new room
#[utoipa::path(
    post,
    path = "/api/v1/rooms",
    security(("bearer_auth" = [])),
    params(TenantHeader),
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created", body = RoomInfo),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 409, description = "Room name already exists", body = ApiError)
    ),
    tag = "rooms"
)]
pub async fn create_room(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomInfo>), ApiError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(validation_error(
            "Room name is required",
            serde_json::json!({ "name": "Must not be empty" }),
        ));
    }

    let base_rate = request.base_rate.unwrap_or(0.0);
    if base_rate < 0.0 {
        return Err(validation_error(
            "Invalid base rate",
            serde_json::json!({ "base_rate": "Must not be negative" }),
        ));
    }

    let repo = RoomRepository::new(&state.db);
    if repo.find_by_name(tenant, name).await?.is_some() {
        return Err(ApiError::new(
            StatusCode::CONFLICT,
            "CONFLICT",
            "Room with this name already exists",
        ));
    }

    let created = repo.insert(tenant, name, base_rate, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(RoomInfo::from_model(created, None))))
}

/// Update a room's name or base rate. Status fields are owned by the
/// lifecycle operations and cannot be set here.
#[utoipa::path(
    patch,
    path = "/api/v1/rooms/{room_id}",
    security(("bearer_auth" = [])),
    params(
        TenantHeader,
        ("room_id" = Uuid, Path, description = "Room identifier")
    ),
    request_body = UpdateRoomRequest,
    responses(
        (status = 200, description = "Room updated", body = RoomInfo),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "Room not found", body = ApiError)
    ),
    tag = "rooms"
)]
pub async fn update_room(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Path(room_id): Path<Uuid>,
    Json(request): Json<UpdateRoomRequest>,
) -> Result<Json<RoomInfo>, ApiError> {
    if request.name.is_none() && request.base_rate.is_none() {
        return Err(validation_error(
            "No updatable fields supplied",
            serde_json::json!({ "body": "Provide name and/or base_rate" }),
        ));
    }

    let name = match request.name {
        Some(ref name) => {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(validation_error(
                    "Room name is required",
                    serde_json::json!({ "name": "Must not be empty" }),
                ));
            }
            Some(trimmed.to_string())
        }
        None => None,
    };

    if let Some(rate) = request.base_rate
        && rate < 0.0
    {
        return Err(validation_error(
            "Invalid base rate",
            serde_json::json!({ "base_rate": "Must not be negative" }),
        ));
    }

    let repo = RoomRepository::new(&state.db);
    let room = repo
        .find_by_tenant(tenant, room_id)
        .await?
        .ok_or(OpsError::NotFound { resource: "room" })
        .map_err(ApiError::from)?;

    let updated = repo
        .update_details(room, name, request.base_rate, Utc::now())
        .await?;

    Ok(Json(RoomInfo::from_model(updated, None)))
}

/// Pre-flight availability probe. Runs the same admission predicate as
/// booking creation against current committed state, without writing.
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{room_id}/availability",
    security(("bearer_auth" = [])),
    params(
        TenantHeader,
        ("room_id" = Uuid, Path, description = "Room identifier"),
        ("start" = String, Query, description = "Candidate interval start (RFC 3339)"),
        ("end" = String, Query, description = "Candidate interval end (RFC 3339)")
    ),
    responses(
        (status = 200, description = "Admission decision", body = AvailabilityResponse),
        (status = 400, description = "Malformed timestamps", body = ApiError),
        (status = 404, description = "Room not found", body = ApiError)
    ),
    tag = "rooms"
)]
pub async fn check_room_availability(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Path(room_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let start = parse_rfc3339("start", &query.start)?;
    let end = parse_rfc3339("end", &query.end)?;

    let policy = state.lifecycle.policy();
    let interval = match BookingInterval::new(start, end, policy) {
        Ok(interval) => interval,
        Err(error) => return Ok(Json(AvailabilityResponse::rejected(error))),
    };

    let room = RoomRepository::new(&state.db)
        .find_by_tenant(tenant, room_id)
        .await?
        .ok_or(OpsError::NotFound { resource: "room" })
        .map_err(ApiError::from)?;

    let decision = check_availability(&state.db, tenant, &room, &interval, policy).await?;

    let response = match decision {
        AvailabilityDecision::Available => AvailabilityResponse::admitted(),
        AvailabilityDecision::Rejected(error) => AvailabilityResponse::rejected(error),
    };

    Ok(Json(response))
}

/// Mark a clean room as inspected
#[utoipa::path(
    post,
    path = "/api/v1/rooms/{room_id}/inspect",
    security(("bearer_auth" = [])),
    params(
        TenantHeader,
        ("room_id" = Uuid, Path, description = "Room identifier")
    ),
    responses(
        (status = 200, description = "Room inspected", body = RoomInfo),
        (status = 404, description = "Room not found", body = ApiError),
        (status = 409, description = "Room is not clean", body = ApiError)
    ),
    tag = "rooms"
)]
pub async fn inspect_room(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    ActorExtension(actor): ActorExtension,
    Path(room_id): Path<Uuid>,
) -> Result<Json<RoomInfo>, ApiError> {
    let updated = state
        .lifecycle
        .inspect_room(tenant, &actor, room_id, Utc::now())
        .await?;

    Ok(Json(RoomInfo::from_model(updated, None)))
}
