//! Booking entity model
//!
//! This module contains the SeaORM entity model for the room_bookings table,
//! one row per reservation of one room for one `[start_at, end_at)` interval.

use super::room::Entity as Room;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle state of a booking. CHECKED_OUT is terminal.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[sea_orm(string_value = "RESERVED")]
    Reserved,
    #[sea_orm(string_value = "CHECKED_IN")]
    CheckedIn,
    #[sea_orm(string_value = "CHECKED_OUT")]
    CheckedOut,
}

impl BookingStatus {
    /// A holding status keeps the room unavailable for other bookings during
    /// its interval.
    pub fn is_holding(self) -> bool {
        matches!(self, BookingStatus::Reserved | BookingStatus::CheckedIn)
    }
}

/// Booking entity representing one reservation of one room
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "room_bookings")]
pub struct Model {
    /// Unique identifier for the booking (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Tenant identifier for multi-tenancy
    pub tenant_id: Uuid,

    /// Room this booking holds
    pub room_id: Uuid,

    /// Start of the booked interval (inclusive)
    pub start_at: DateTimeWithTimeZone,

    /// End of the booked interval (exclusive)
    pub end_at: DateTimeWithTimeZone,

    /// Current lifecycle state
    pub status: BookingStatus,

    /// Explicit hourly rate override; the room's base rate applies when unset
    pub rate_per_hour: Option<f64>,

    /// Total amount, computed at creation when not supplied
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

    /// Timestamp when the booking was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the booking was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Room",
        from = "Column::RoomId",
        to = "super::room::Column::Id"
    )]
    Room,
}

impl Related<Room> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
