//! # Room Repository
//!
//! Repository operations for the rooms table, encapsulating SeaORM queries
//! with tenant-aware access patterns. Status fields on returned models are
//! only ever modified by the lifecycle controller.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::auth::TenantId;
use crate::models::room::{ActiveModel, Column, Entity, HousekeepingStatus, Model, RoomStatus};

/// Repository for room database operations
pub struct RoomRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> RoomRepository<'a, C> {
    /// Create a new RoomRepository borrowing the given connection
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Find a room by ID, ensuring it belongs to the specified tenant
    pub async fn find_by_tenant(
        &self,
        tenant: TenantId,
        room_id: Uuid,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(room_id)
            .filter(Column::TenantId.eq(tenant.0))
            .one(self.conn)
            .await
    }

    /// Find a room by its per-tenant unique name
    pub async fn find_by_name(
        &self,
        tenant: TenantId,
        name: &str,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::TenantId.eq(tenant.0))
            .filter(Column::Name.eq(name))
            .one(self.conn)
            .await
    }

    /// List all rooms for a tenant, ordered by name
    pub async fn list_by_tenant(&self, tenant: TenantId) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TenantId.eq(tenant.0))
            .order_by_asc(Column::Name)
            .all(self.conn)
            .await
    }

    /// Insert a new room in its initial state (AVAILABLE, CLEAN, in service)
    pub async fn insert(
        &self,
        tenant: TenantId,
        name: &str,
        base_rate: f64,
        now: DateTime<Utc>,
    ) -> Result<Model, DbErr> {
        let room = ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant.0),
            name: Set(name.to_string()),
            status: Set(RoomStatus::Available),
            housekeeping_status: Set(HousekeepingStatus::Clean),
            out_of_order: Set(false),
            base_rate: Set(base_rate),
            inspected_at: Set(None),
            created_at: Set(now.fixed_offset()),
            updated_at: Set(now.fixed_offset()),
        };

        let created = room.insert(self.conn).await?;

        tracing::info!(
            tenant_id = %tenant.0,
            room_id = %created.id,
            name = %created.name,
            "Room created"
        );

        Ok(created)
    }

    /// Update the descriptive fields of a room (name, base rate). Status
    /// fields are deliberately not reachable from here.
    pub async fn update_details(
        &self,
        room: Model,
        name: Option<String>,
        base_rate: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<Model, DbErr> {
        let mut active: ActiveModel = room.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(rate) = base_rate {
            active.base_rate = Set(rate);
        }
        active.updated_at = Set(now.fixed_offset());

        active.update(self.conn).await
    }
}
