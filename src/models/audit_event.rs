//! AuditEvent entity model
//!
//! Append-only trail of lifecycle transitions for operational traceability.
//! Nothing on a decision path reads this table.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Audit event entity recording one lifecycle transition
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_events")]
pub struct Model {
    /// Unique identifier for the event (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Tenant identifier for multi-tenancy
    pub tenant_id: Uuid,

    /// Room the transition acted on, if any
    pub room_id: Option<Uuid>,

    /// Booking the transition acted on, if any
    pub booking_id: Option<Uuid>,

    /// Identity of the caller that requested the transition
    pub actor: String,

    /// Transition name (e.g. "booking.check_in")
    pub action: String,

    /// Timestamp of the transition
    pub recorded_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
