//! # Bookings API Handlers
//!
//! This module contains handlers for the booking ledger: listing, creation
//! and the check-in/check-out transitions.

use crate::auth::{ActorExtension, OperatorAuth, TenantExtension, TenantHeader};
use crate::error::{ApiError, validation_error};
use crate::handlers::parse_rfc3339;
use crate::lifecycle::CreateBookingRequest;
use crate::models::booking::{self, BookingStatus};
use crate::repositories::{BookingListFilter, BookingRepository};
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::housekeeping::TaskInfo;

/// Booking information response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingInfo {
    /// Unique identifier for the booking
    pub id: Uuid,
    /// Room this booking holds
    pub room_id: Uuid,
    /// Start of the booked interval (RFC 3339)
    #[schema(example = "2025-07-01T10:00:00Z")]
    pub start_at: String,
    /// End of the booked interval (RFC 3339)
    #[schema(example = "2025-07-01T12:00:00Z")]
    pub end_at: String,
    /// Current lifecycle state
    pub status: BookingStatus,
    /// Explicit hourly rate override
    pub rate_per_hour: Option<f64>,
    /// Total amount
    pub amount: f64,
    /// Who placed the booking
    pub booked_by: Option<String>,
    /// Guest the room is held for
    pub guest_name: Option<String>,
    /// Free-form purpose of the stay
    pub purpose: Option<String>,
    /// Number of adult occupants
    pub adults: i32,
    /// Number of child occupants
    pub children: i32,
}

impl From<booking::Model> for BookingInfo {
    fn from(model: booking::Model) -> Self {
        Self {
            id: model.id,
            room_id: model.room_id,
            start_at: model.start_at.to_rfc3339(),
            end_at: model.end_at.to_rfc3339(),
            status: model.status,
            rate_per_hour: model.rate_per_hour,
            amount: model.amount,
            booked_by: model.booked_by,
            guest_name: model.guest_name,
            purpose: model.purpose,
            adults: model.adults,
            children: model.children,
        }
    }
}

/// Request payload for creating a booking
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateBookingRequestDto {
    /// Room to book
    pub room_id: Uuid,
    /// Start of the interval (RFC 3339)
    #[schema(example = "2025-07-01T10:00:00Z")]
    pub start_at: String,
    /// End of the interval (RFC 3339)
    #[schema(example = "2025-07-01T12:00:00Z")]
    pub end_at: String,
    /// Explicit hourly rate; the room's base rate applies when omitted
    pub rate_per_hour: Option<f64>,
    /// Explicit total amount; computed from rate and duration when omitted
    pub amount: Option<f64>,
    /// Who is placing the booking
    pub booked_by: Option<String>,
    /// Guest the room is held for
    pub guest_name: Option<String>,
    /// Free-form purpose of the stay
    pub purpose: Option<String>,
    /// Number of adult occupants (default 1)
    pub adults: Option<i32>,
    /// Number of child occupants (default 0)
    pub children: Option<i32>,
}

/// Query parameters for listing bookings
#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    /// Filter by room
    pub room_id: Option<Uuid>,
    /// Only bookings starting at/after this timestamp (RFC 3339)
    pub date_from: Option<String>,
    /// Only bookings starting at/before this timestamp (RFC 3339)
    pub date_to: Option<String>,
    /// Maximum number of bookings to return (default: 100, max: 500)
    pub limit: Option<u32>,
}

/// Query parameters for the upcoming-bookings listing
#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    /// Horizon in hours (default from configuration, max 240)
    pub hours: Option<i64>,
}

/// Response payload for a checkout: the terminal booking plus the turnover
/// task it opened
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckOutResponse {
    pub booking: BookingInfo,
    pub housekeeping_task: TaskInfo,
}

/// List bookings for the tenant, newest first
#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    security(("bearer_auth" = [])),
    params(
        TenantHeader,
        ("room_id" = Option<Uuid>, Query, description = "Filter by room"),
        ("date_from" = Option<String>, Query, description = "Bookings starting at/after (RFC 3339)"),
        ("date_to" = Option<String>, Query, description = "Bookings starting at/before (RFC 3339)"),
        ("limit" = Option<u32>, Query, description = "Maximum number of bookings (default 100, max 500)")
    ),
    responses(
        (status = 200, description = "Bookings for the tenant", body = Vec<BookingInfo>),
        (status = 400, description = "Invalid query parameters", body = ApiError)
    ),
    tag = "bookings"
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Query(params): Query<ListBookingsQuery>,
) -> Result<Json<Vec<BookingInfo>>, ApiError> {
    let limit = match params.limit {
        Some(0) | Some(501..) => {
            return Err(validation_error(
                "Invalid limit",
                serde_json::json!({ "limit": "Must be between 1 and 500" }),
            ));
        }
        Some(value) => u64::from(value),
        None => 100,
    };

    let from = params
        .date_from
        .as_deref()
        .map(|v| parse_rfc3339("date_from", v))
        .transpose()?;
    let to = params
        .date_to
        .as_deref()
        .map(|v| parse_rfc3339("date_to", v))
        .transpose()?;

    let bookings = BookingRepository::new(&state.db)
        .list_by_tenant(
            tenant,
            BookingListFilter {
                room_id: params.room_id,
                from,
                to,
                limit,
            },
        )
        .await?;

    Ok(Json(bookings.into_iter().map(BookingInfo::from).collect()))
}

/// Create a booking. Admission control and the insert run atomically; a
/// rejected admission surfaces its reason unchanged.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    security(("bearer_auth" = [])),
    params(TenantHeader),
    request_body = CreateBookingRequestDto,
    responses(
        (status = 201, description = "Booking created", body = BookingInfo),
        (status = 400, description = "Invalid interval or payload", body = ApiError),
        (status = 404, description = "Room not found", body = ApiError),
        (status = 409, description = "Overlap or room out of order", body = ApiError)
    ),
    tag = "bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    ActorExtension(actor): ActorExtension,
    Json(request): Json<CreateBookingRequestDto>,
) -> Result<(StatusCode, Json<BookingInfo>), ApiError> {
    let start_at = parse_rfc3339("start_at", &request.start_at)?;
    let end_at = parse_rfc3339("end_at", &request.end_at)?;

    if let Some(rate) = request.rate_per_hour
        && rate < 0.0
    {
        return Err(validation_error(
            "Invalid rate",
            serde_json::json!({ "rate_per_hour": "Must not be negative" }),
        ));
    }
    if let Some(amount) = request.amount
        && amount < 0.0
    {
        return Err(validation_error(
            "Invalid amount",
            serde_json::json!({ "amount": "Must not be negative" }),
        ));
    }

    let created = state
        .lifecycle
        .create_booking(
            tenant,
            &actor,
            CreateBookingRequest {
                room_id: request.room_id,
                start_at,
                end_at,
                rate_per_hour: request.rate_per_hour,
                amount: request.amount,
                booked_by: request.booked_by,
                guest_name: request.guest_name,
                purpose: request.purpose,
                adults: request.adults.unwrap_or(1),
                children: request.children.unwrap_or(0),
            },
            Utc::now(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(BookingInfo::from(created))))
}

/// List bookings starting or ending within the configured upcoming horizon
#[utoipa::path(
    get,
    path = "/api/v1/bookings/upcoming",
    security(("bearer_auth" = [])),
    params(
        TenantHeader,
        ("hours" = Option<i64>, Query, description = "Horizon in hours (1-240)")
    ),
    responses(
        (status = 200, description = "Upcoming bookings", body = Vec<BookingInfo>),
        (status = 400, description = "Invalid horizon", body = ApiError)
    ),
    tag = "bookings"
)]
pub async fn upcoming_bookings(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Query(params): Query<UpcomingQuery>,
) -> Result<Json<Vec<BookingInfo>>, ApiError> {
    let hours = params
        .hours
        .unwrap_or(state.config.booking.upcoming_window_hours);
    if !(1..=240).contains(&hours) {
        return Err(validation_error(
            "Invalid horizon",
            serde_json::json!({ "hours": "Must be between 1 and 240" }),
        ));
    }

    let now = Utc::now();
    let bookings = BookingRepository::new(&state.db)
        .list_upcoming(tenant, now, now + Duration::hours(hours))
        .await?;

    Ok(Json(bookings.into_iter().map(BookingInfo::from).collect()))
}

/// Check a RESERVED booking in
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{booking_id}/check-in",
    security(("bearer_auth" = [])),
    params(
        TenantHeader,
        ("booking_id" = Uuid, Path, description = "Booking identifier")
    ),
    responses(
        (status = 200, description = "Booking checked in", body = BookingInfo),
        (status = 404, description = "Booking not found", body = ApiError),
        (status = 409, description = "Room unavailable, wrong state or outside window", body = ApiError)
    ),
    tag = "bookings"
)]
pub async fn check_in(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    ActorExtension(actor): ActorExtension,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingInfo>, ApiError> {
    let updated = state
        .lifecycle
        .check_in(tenant, &actor, booking_id, Utc::now())
        .await?;

    Ok(Json(BookingInfo::from(updated)))
}

/// Check a CHECKED_IN booking out, opening the turnover task
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{booking_id}/check-out",
    security(("bearer_auth" = [])),
    params(
        TenantHeader,
        ("booking_id" = Uuid, Path, description = "Booking identifier")
    ),
    responses(
        (status = 200, description = "Booking checked out", body = CheckOutResponse),
        (status = 404, description = "Booking not found", body = ApiError),
        (status = 409, description = "Booking is not checked in", body = ApiError)
    ),
    tag = "bookings"
)]
pub async fn check_out(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    ActorExtension(actor): ActorExtension,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<CheckOutResponse>, ApiError> {
    let outcome = state
        .lifecycle
        .check_out(tenant, &actor, booking_id, Utc::now())
        .await?;

    Ok(Json(CheckOutResponse {
        booking: BookingInfo::from(outcome.booking),
        housekeeping_task: TaskInfo::from(outcome.housekeeping_task),
    }))
}
