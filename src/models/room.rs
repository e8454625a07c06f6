//! Room entity model
//!
//! This module contains the SeaORM entity model for the rooms table, one row
//! per bookable inventory unit. The status columns are a persisted projection
//! of the active booking, housekeeping and maintenance state; only the
//! lifecycle controller writes them.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Operational status of a room.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    #[sea_orm(string_value = "AVAILABLE")]
    Available,
    #[sea_orm(string_value = "RESERVED")]
    Reserved,
    #[sea_orm(string_value = "OCCUPIED")]
    Occupied,
    #[sea_orm(string_value = "CLEANING")]
    Cleaning,
    #[sea_orm(string_value = "OUT_OF_ORDER")]
    OutOfOrder,
}

/// Turnover state of a room between checkout and the next stay.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HousekeepingStatus {
    #[sea_orm(string_value = "CLEAN")]
    Clean,
    #[sea_orm(string_value = "CLEANING")]
    Cleaning,
    #[sea_orm(string_value = "INSPECTED")]
    Inspected,
}

/// Room entity representing one inventory unit per tenant
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    /// Unique identifier for the room (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Tenant identifier for multi-tenancy
    pub tenant_id: Uuid,

    /// Room name, unique per tenant (e.g. "204")
    pub name: String,

    /// Current operational status
    pub status: RoomStatus,

    /// Current turnover state
    pub housekeeping_status: HousekeepingStatus,

    /// True while an open maintenance ticket removes the room from service
    pub out_of_order: bool,

    /// Hourly rate used when a booking omits an explicit price
    pub base_rate: f64,

    /// Timestamp of the last housekeeping inspection
    pub inspected_at: Option<DateTimeWithTimeZone>,

    /// Timestamp when the room was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the room was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
    #[sea_orm(has_many = "super::maintenance_ticket::Entity")]
    MaintenanceTickets,
    #[sea_orm(has_many = "super::housekeeping_task::Entity")]
    HousekeepingTasks,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::maintenance_ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenanceTickets.def()
    }
}

impl Related<super::housekeeping_task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HousekeepingTasks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
