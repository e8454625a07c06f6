//! Test utilities for database testing.
//!
//! Provides an in-memory SQLite database with migrations applied, plus
//! fixture builders for tenants, rooms and bookings.

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use uuid::Uuid;

use roomops::auth::TenantId;
use roomops::availability::BookingPolicy;
use roomops::lifecycle::{CreateBookingRequest, LifecycleController};
use roomops::models::booking::{self, BookingStatus};
use roomops::models::room::{self, HousekeepingStatus, RoomStatus};
use roomops::repositories::{RoomRepository, TenantRepository};

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// A single pooled connection keeps every query on the same in-memory
/// database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Creates a test tenant and returns its scoping id.
#[allow(dead_code)]
pub async fn create_test_tenant(db: &DatabaseConnection) -> Result<TenantId> {
    let tenant = TenantRepository::new(db)
        .create(Some("Test Tenant".to_string()))
        .await?;
    Ok(TenantId(tenant.id))
}

/// A lifecycle controller over the test database with the default policy.
#[allow(dead_code)]
pub fn controller(db: &DatabaseConnection) -> LifecycleController {
    LifecycleController::new(db.clone(), BookingPolicy::default())
}

/// A fixed, deterministic instant on the test day.
#[allow(dead_code)]
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 10, hour, minute, 0).unwrap()
}

/// Creates a room in its initial AVAILABLE state.
#[allow(dead_code)]
pub async fn seed_room(
    db: &DatabaseConnection,
    tenant: TenantId,
    name: &str,
    base_rate: f64,
) -> Result<room::Model> {
    let room = RoomRepository::new(db)
        .insert(tenant, name, base_rate, at(0, 0))
        .await?;
    Ok(room)
}

/// Overrides a room's state directly, bypassing the lifecycle controller, to
/// stage guard scenarios.
#[allow(dead_code)]
pub async fn force_room_state(
    db: &DatabaseConnection,
    room: room::Model,
    status: RoomStatus,
    housekeeping_status: HousekeepingStatus,
) -> Result<room::Model> {
    let mut active: room::ActiveModel = room.into();
    active.status = Set(status);
    active.housekeeping_status = Set(housekeeping_status);
    let updated = active.update(db).await?;
    Ok(updated)
}

/// Inserts a booking row with an explicit status, bypassing admission
/// control, to stage transition scenarios.
#[allow(dead_code)]
pub async fn seed_booking(
    db: &DatabaseConnection,
    tenant: TenantId,
    room_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    status: BookingStatus,
    amount: f64,
) -> Result<booking::Model> {
    let model = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant.0),
        room_id: Set(room_id),
        start_at: Set(start.fixed_offset()),
        end_at: Set(end.fixed_offset()),
        status: Set(status),
        rate_per_hour: Set(None),
        amount: Set(amount),
        booked_by: Set(Some("Tester".to_string())),
        guest_name: Set(None),
        purpose: Set(Some("Test".to_string())),
        adults: Set(1),
        children: Set(0),
        created_at: Set(start.fixed_offset()),
        updated_at: Set(start.fixed_offset()),
    };
    let created = model.insert(db).await?;
    Ok(created)
}

/// A minimal create-booking request for the given room and interval.
#[allow(dead_code)]
pub fn booking_request(
    room_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> CreateBookingRequest {
    CreateBookingRequest {
        room_id,
        start_at: start,
        end_at: end,
        rate_per_hour: None,
        amount: None,
        booked_by: Some("Tester".to_string()),
        guest_name: None,
        purpose: Some("Test".to_string()),
        adults: 1,
        children: 0,
    }
}
