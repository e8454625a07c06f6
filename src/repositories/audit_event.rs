//! # AuditEvent Repository
//!
//! Append-only repository for the audit_events table. Lifecycle transitions
//! append in the same transaction as their state changes; nothing reads the
//! trail on a decision path.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, Set};
use uuid::Uuid;

use crate::auth::TenantId;
use crate::models::audit_event::{ActiveModel, Model};

/// Repository for audit event writes
pub struct AuditEventRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AuditEventRepository<'a, C> {
    /// Create a new AuditEventRepository borrowing the given connection
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Append one audit record for a lifecycle transition
    pub async fn append(
        &self,
        tenant: TenantId,
        room_id: Option<Uuid>,
        booking_id: Option<Uuid>,
        actor: &str,
        action: &str,
        now: DateTime<Utc>,
    ) -> Result<Model, DbErr> {
        let event = ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant.0),
            room_id: Set(room_id),
            booking_id: Set(booking_id),
            actor: Set(actor.to_string()),
            action: Set(action.to_string()),
            recorded_at: Set(now.fixed_offset()),
        };

        event.insert(self.conn).await
    }
}
