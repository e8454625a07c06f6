//! Migration to create the maintenance_tickets table.
//!
//! A ticket records a room's removal from service. The out-of-order gate in
//! admission control reads the most recent OPEN ticket per room.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MaintenanceTickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MaintenanceTickets::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceTickets::TenantId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MaintenanceTickets::RoomId).uuid().not_null())
                    .col(
                        ColumnDef::new(MaintenanceTickets::Status)
                            .text()
                            .not_null()
                            .default("OPEN"),
                    )
                    .col(
                        ColumnDef::new(MaintenanceTickets::Description)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceTickets::DueAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceTickets::OpenedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(MaintenanceTickets::ClosedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_tickets_tenant_id")
                            .from(MaintenanceTickets::Table, MaintenanceTickets::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_tickets_room_id")
                            .from(MaintenanceTickets::Table, MaintenanceTickets::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_maintenance_tickets_room_status_opened")
                    .table(MaintenanceTickets::Table)
                    .col(MaintenanceTickets::RoomId)
                    .col(MaintenanceTickets::Status)
                    .col(MaintenanceTickets::OpenedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_maintenance_tickets_room_status_opened")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(MaintenanceTickets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MaintenanceTickets {
    Table,
    Id,
    TenantId,
    RoomId,
    Status,
    Description,
    DueAt,
    OpenedAt,
    ClosedAt,
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Rooms {
    Table,
    Id,
}
