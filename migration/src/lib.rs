//! Database migrations for the RoomOps API.
//!
//! This module contains all database migrations using SeaORM Migration.
//! The schema is fixed and versioned; it is applied once at startup rather
//! than bootstrapped ad hoc by request handlers.

pub use sea_orm_migration::prelude::*;

mod m2025_07_01_000001_create_tenants;
mod m2025_07_01_000100_create_rooms;
mod m2025_07_01_000200_create_room_bookings;
mod m2025_07_01_000300_create_maintenance_tickets;
mod m2025_07_01_000400_create_housekeeping_tasks;
mod m2025_07_01_000500_create_audit_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_07_01_000001_create_tenants::Migration),
            Box::new(m2025_07_01_000100_create_rooms::Migration),
            Box::new(m2025_07_01_000200_create_room_bookings::Migration),
            Box::new(m2025_07_01_000300_create_maintenance_tickets::Migration),
            Box::new(m2025_07_01_000400_create_housekeeping_tasks::Migration),
            Box::new(m2025_07_01_000500_create_audit_events::Migration),
        ]
    }
}
