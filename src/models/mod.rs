//! # Data Models
//!
//! This module contains all the data models used throughout the RoomOps API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod audit_event;
pub mod booking;
pub mod housekeeping_task;
pub mod maintenance_ticket;
pub mod room;
pub mod tenant;

pub use audit_event::Entity as AuditEvent;
pub use booking::Entity as Booking;
pub use housekeeping_task::Entity as HousekeepingTask;
pub use maintenance_ticket::Entity as MaintenanceTicket;
pub use room::Entity as Room;
pub use tenant::Entity as Tenant;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "roomops".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
