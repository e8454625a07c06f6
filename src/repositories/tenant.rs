//! # Tenant Repository
//!
//! Repository operations for the tenants table.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, Set};
use uuid::Uuid;

use crate::models::tenant::{ActiveModel, Entity, Model};

/// Repository for tenant database operations
pub struct TenantRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> TenantRepository<'a, C> {
    /// Create a new TenantRepository borrowing the given connection
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Create a new tenant
    pub async fn create(&self, name: Option<String>) -> Result<Model, DbErr> {
        let tenant = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let created = tenant.insert(self.conn).await?;
        tracing::info!(tenant_id = %created.id, "Tenant created");
        Ok(created)
    }

    /// Find a tenant by ID
    pub async fn find_by_id(&self, tenant_id: Uuid) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(tenant_id).one(self.conn).await
    }
}
