//! # HousekeepingTask Repository
//!
//! Repository operations for the housekeeping_tasks table.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::auth::TenantId;
use crate::models::housekeeping_task::{ActiveModel, Column, Entity, Model, TaskStatus};

/// Repository for housekeeping task database operations
pub struct HousekeepingTaskRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> HousekeepingTaskRepository<'a, C> {
    /// Create a new HousekeepingTaskRepository borrowing the given connection
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Find a task by ID, ensuring it belongs to the specified tenant
    pub async fn find_by_tenant(
        &self,
        tenant: TenantId,
        task_id: Uuid,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(task_id)
            .filter(Column::TenantId.eq(tenant.0))
            .one(self.conn)
            .await
    }

    /// List tasks for a tenant with optional status filtering, newest first
    pub async fn list_by_tenant(
        &self,
        tenant: TenantId,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Model>, DbErr> {
        let mut query = Entity::find()
            .filter(Column::TenantId.eq(tenant.0))
            .order_by_desc(Column::StartedAt);

        if let Some(status) = status {
            query = query.filter(Column::Status.eq(status));
        }

        query.all(self.conn).await
    }

    /// Create a turnover task for a room, in progress from `now`
    pub async fn open(
        &self,
        tenant: TenantId,
        room_id: Uuid,
        booking_id: Option<Uuid>,
        checklist: Option<JsonValue>,
        now: DateTime<Utc>,
    ) -> Result<Model, DbErr> {
        let task = ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant.0),
            room_id: Set(room_id),
            booking_id: Set(booking_id),
            status: Set(TaskStatus::InProgress),
            checklist: Set(checklist),
            started_at: Set(now.fixed_offset()),
            completed_at: Set(None),
        };

        let created = task.insert(self.conn).await?;

        tracing::info!(
            tenant_id = %tenant.0,
            room_id = %room_id,
            task_id = %created.id,
            "Housekeeping task opened"
        );

        Ok(created)
    }
}
