//! MaintenanceTicket entity model
//!
//! A ticket records a room's removal from service. A room is out of order
//! exactly while it has at least one OPEN ticket; returning the room to
//! service closes all of them.

use super::room::Entity as Room;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// State of a maintenance ticket.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    #[sea_orm(string_value = "OPEN")]
    Open,
    #[sea_orm(string_value = "CLOSED")]
    Closed,
}

/// Maintenance ticket entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "maintenance_tickets")]
pub struct Model {
    /// Unique identifier for the ticket (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Tenant identifier for multi-tenancy
    pub tenant_id: Uuid,

    /// Room the ticket removes from service
    pub room_id: Uuid,

    /// Current ticket state
    pub status: TicketStatus,

    /// Why the room was taken out of service
    pub description: String,

    /// Expected return to service; None means indefinite
    pub due_at: Option<DateTimeWithTimeZone>,

    /// Timestamp when the ticket was opened
    pub opened_at: DateTimeWithTimeZone,

    /// Timestamp when the ticket was closed
    pub closed_at: Option<DateTimeWithTimeZone>,
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
