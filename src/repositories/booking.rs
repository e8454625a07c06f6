//! # Booking Repository
//!
//! Repository operations for the room_bookings table. The conflict and
//! active-holding queries here are the storage half of admission control and
//! the return-to-service guard; both operate on holding statuses only
//! (RESERVED, CHECKED_IN).

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::auth::TenantId;
use crate::models::booking::{ActiveModel, BookingStatus, Column, Entity, Model};

/// Optional filters for booking listings
#[derive(Debug, Default, Clone)]
pub struct BookingListFilter {
    pub room_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: u64,
}

/// Fields of a new booking row; amount is computed by the caller before the
/// insert so the ledger never stores a provisional price.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub room_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub rate_per_hour: Option<f64>,
    pub amount: f64,
    pub booked_by: Option<String>,
    pub guest_name: Option<String>,
    pub purpose: Option<String>,
    pub adults: i32,
    pub children: i32,
}

/// Repository for booking database operations
pub struct BookingRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> BookingRepository<'a, C> {
    /// Create a new BookingRepository borrowing the given connection
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Find a booking by ID, ensuring it belongs to the specified tenant
    pub async fn find_by_tenant(
        &self,
        tenant: TenantId,
        booking_id: Uuid,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(booking_id)
            .filter(Column::TenantId.eq(tenant.0))
            .one(self.conn)
            .await
    }

    /// List bookings for a tenant with optional room/date filtering, newest
    /// first
    pub async fn list_by_tenant(
        &self,
        tenant: TenantId,
        filter: BookingListFilter,
    ) -> Result<Vec<Model>, DbErr> {
        let mut query = Entity::find()
            .filter(Column::TenantId.eq(tenant.0))
            .order_by_desc(Column::StartAt);

        if let Some(room_id) = filter.room_id {
            query = query.filter(Column::RoomId.eq(room_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(Column::StartAt.gte(from.fixed_offset()));
        }
        if let Some(to) = filter.to {
            query = query.filter(Column::StartAt.lte(to.fixed_offset()));
        }

        query.limit(filter.limit).all(self.conn).await
    }

    /// Holding bookings on a room whose `[start, end)` interval strictly
    /// overlaps the candidate one. A booking that merely touches an edge
    /// (ends exactly at `start`, or starts exactly at `end`) is not returned:
    /// back-to-back bookings are allowed.
    pub async fn find_conflicts(
        &self,
        tenant: TenantId,
        room_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TenantId.eq(tenant.0))
            .filter(Column::RoomId.eq(room_id))
            .filter(Column::Status.is_in([BookingStatus::Reserved, BookingStatus::CheckedIn]))
            .filter(Column::StartAt.lt(end.fixed_offset()))
            .filter(Column::EndAt.gt(start.fixed_offset()))
            .order_by_asc(Column::StartAt)
            .limit(limit)
            .all(self.conn)
            .await
    }

    /// The holding booking whose interval contains `at`, if any
    pub async fn find_active_holding(
        &self,
        tenant: TenantId,
        room_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::TenantId.eq(tenant.0))
            .filter(Column::RoomId.eq(room_id))
            .filter(Column::Status.is_in([BookingStatus::Reserved, BookingStatus::CheckedIn]))
            .filter(Column::StartAt.lte(at.fixed_offset()))
            .filter(Column::EndAt.gt(at.fixed_offset()))
            .order_by_desc(Column::StartAt)
            .one(self.conn)
            .await
    }

    /// All holding bookings for a tenant whose interval contains `at`, across
    /// rooms (occupancy snapshots, room listings)
    pub async fn list_active_holding_by_tenant(
        &self,
        tenant: TenantId,
        at: DateTime<Utc>,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TenantId.eq(tenant.0))
            .filter(Column::Status.is_in([BookingStatus::Reserved, BookingStatus::CheckedIn]))
            .filter(Column::StartAt.lte(at.fixed_offset()))
            .filter(Column::EndAt.gt(at.fixed_offset()))
            .all(self.conn)
            .await
    }

    /// Bookings that start or end within `[from, until)`, soonest first
    pub async fn list_upcoming(
        &self,
        tenant: TenantId,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TenantId.eq(tenant.0))
            .filter(
                sea_orm::Condition::any()
                    .add(
                        Column::StartAt
                            .gte(from.fixed_offset())
                            .and(Column::StartAt.lt(until.fixed_offset())),
                    )
                    .add(
                        Column::EndAt
                            .gte(from.fixed_offset())
                            .and(Column::EndAt.lt(until.fixed_offset())),
                    ),
            )
            .order_by_asc(Column::StartAt)
            .all(self.conn)
            .await
    }

    /// Bookings whose start lies within `[from, to]` (KPI windows)
    pub async fn list_started_within(
        &self,
        tenant: TenantId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TenantId.eq(tenant.0))
            .filter(Column::StartAt.gte(from.fixed_offset()))
            .filter(Column::StartAt.lte(to.fixed_offset()))
            .all(self.conn)
            .await
    }

    /// Insert a new booking in RESERVED state
    pub async fn insert(
        &self,
        tenant: TenantId,
        new_booking: NewBooking,
        now: DateTime<Utc>,
    ) -> Result<Model, DbErr> {
        let booking = ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant.0),
            room_id: Set(new_booking.room_id),
            start_at: Set(new_booking.start_at.fixed_offset()),
            end_at: Set(new_booking.end_at.fixed_offset()),
            status: Set(BookingStatus::Reserved),
            rate_per_hour: Set(new_booking.rate_per_hour),
            amount: Set(new_booking.amount),
            booked_by: Set(new_booking.booked_by),
            guest_name: Set(new_booking.guest_name),
            purpose: Set(new_booking.purpose),
            adults: Set(new_booking.adults),
            children: Set(new_booking.children),
            created_at: Set(now.fixed_offset()),
            updated_at: Set(now.fixed_offset()),
        };

        let created = booking.insert(self.conn).await?;

        tracing::info!(
            tenant_id = %tenant.0,
            booking_id = %created.id,
            room_id = %created.room_id,
            "Booking created"
        );

        Ok(created)
    }
}
