//! Migration to create the housekeeping_tasks table.
//!
//! One task per checkout; completing it is the only path back to an
//! AVAILABLE room.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HousekeepingTasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HousekeepingTasks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(HousekeepingTasks::TenantId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(HousekeepingTasks::RoomId).uuid().not_null())
                    .col(ColumnDef::new(HousekeepingTasks::BookingId).uuid().null())
                    .col(
                        ColumnDef::new(HousekeepingTasks::Status)
                            .text()
                            .not_null()
                            .default("IN_PROGRESS"),
                    )
                    .col(
                        ColumnDef::new(HousekeepingTasks::Checklist)
                            .json_binary()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(HousekeepingTasks::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(HousekeepingTasks::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_housekeeping_tasks_tenant_id")
                            .from(HousekeepingTasks::Table, HousekeepingTasks::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_housekeeping_tasks_room_id")
                            .from(HousekeepingTasks::Table, HousekeepingTasks::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_housekeeping_tasks_tenant_status_started")
                    .table(HousekeepingTasks::Table)
                    .col(HousekeepingTasks::TenantId)
                    .col(HousekeepingTasks::Status)
                    .col(HousekeepingTasks::StartedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_housekeeping_tasks_tenant_status_started")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(HousekeepingTasks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum HousekeepingTasks {
    Table,
    Id,
    TenantId,
    RoomId,
    BookingId,
    Status,
    Checklist,
    StartedAt,
    CompletedAt,
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
