//! HousekeepingTask entity model
//!
//! One task per checkout, tracking turnover until the room is bookable again.

use super::room::Entity as Room;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// State of a housekeeping task.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "CLEAN")]
    Clean,
}

/// Housekeeping task entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "housekeeping_tasks")]
pub struct Model {
    /// Unique identifier for the task (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Tenant identifier for multi-tenancy
    pub tenant_id: Uuid,

    /// Room being turned over
    pub room_id: Uuid,

    /// Booking whose checkout created the task
    pub booking_id: Option<Uuid>,

    /// Current task state
    pub status: TaskStatus,

    /// Checklist items for the turnover
    #[sea_orm(column_type = "JsonBinary")]
    pub checklist: Option<JsonValue>,

    /// Timestamp when the task was created (at checkout)
    pub started_at: DateTimeWithTimeZone,

    /// Timestamp when the task was completed
    pub completed_at: Option<DateTimeWithTimeZone>,
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
