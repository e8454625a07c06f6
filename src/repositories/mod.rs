//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM
//! operations for database entities, providing a clean API for data access
//! with tenant-aware methods.
//!
//! Every method takes a [`TenantId`](crate::auth::TenantId), so cross-tenant
//! access is impossible to express. Repositories borrow any
//! `ConnectionTrait` implementor, which lets the same query code run against
//! the pool for plain reads and inside a lifecycle transaction for writes.

pub mod audit_event;
pub mod booking;
pub mod housekeeping_task;
pub mod maintenance_ticket;
pub mod room;
pub mod tenant;

pub use audit_event::AuditEventRepository;
pub use booking::{BookingListFilter, BookingRepository};
pub use housekeeping_task::HousekeepingTaskRepository;
pub use maintenance_ticket::MaintenanceTicketRepository;
pub use room::RoomRepository;
pub use tenant::TenantRepository;
