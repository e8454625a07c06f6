//! # MaintenanceTicket Repository
//!
//! Repository operations for the maintenance_tickets table.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::auth::TenantId;
use crate::models::maintenance_ticket::{ActiveModel, Column, Entity, Model, TicketStatus};

/// Repository for maintenance ticket database operations
pub struct MaintenanceTicketRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> MaintenanceTicketRepository<'a, C> {
    /// Create a new MaintenanceTicketRepository borrowing the given connection
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// The most recently opened OPEN ticket for a room, if any
    pub async fn latest_open_for_room(
        &self,
        tenant: TenantId,
        room_id: Uuid,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::TenantId.eq(tenant.0))
            .filter(Column::RoomId.eq(room_id))
            .filter(Column::Status.eq(TicketStatus::Open))
            .order_by_desc(Column::OpenedAt)
            .one(self.conn)
            .await
    }

    /// List all tickets for a room, newest first
    pub async fn list_for_room(
        &self,
        tenant: TenantId,
        room_id: Uuid,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TenantId.eq(tenant.0))
            .filter(Column::RoomId.eq(room_id))
            .order_by_desc(Column::OpenedAt)
            .all(self.conn)
            .await
    }

    /// Open a new ticket for a room
    pub async fn open(
        &self,
        tenant: TenantId,
        room_id: Uuid,
        description: &str,
        due_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Model, DbErr> {
        let ticket = ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant.0),
            room_id: Set(room_id),
            status: Set(TicketStatus::Open),
            description: Set(description.to_string()),
            due_at: Set(due_at.map(|dt| dt.fixed_offset())),
            opened_at: Set(now.fixed_offset()),
            closed_at: Set(None),
        };

        let created = ticket.insert(self.conn).await?;

        tracing::info!(
            tenant_id = %tenant.0,
            room_id = %room_id,
            ticket_id = %created.id,
            "Maintenance ticket opened"
        );

        Ok(created)
    }

    /// Close every OPEN ticket for a room, returning how many were closed
    pub async fn close_open_for_room(
        &self,
        tenant: TenantId,
        room_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        let result = Entity::update_many()
            .col_expr(Column::Status, Expr::value(TicketStatus::Closed))
            .col_expr(Column::ClosedAt, Expr::value(Some(now.fixed_offset())))
            .filter(Column::TenantId.eq(tenant.0))
            .filter(Column::RoomId.eq(room_id))
            .filter(Column::Status.eq(TicketStatus::Open))
            .exec(self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}
