//! Migration to create the room_bookings table.
//!
//! One row per reservation of one room for one time interval. The overlap
//! check scans holding bookings per room, so the hot index covers
//! (room_id, status, start_at).

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RoomBookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoomBookings::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RoomBookings::TenantId).uuid().not_null())
                    .col(ColumnDef::new(RoomBookings::RoomId).uuid().not_null())
                    .col(
                        ColumnDef::new(RoomBookings::StartAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RoomBookings::EndAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RoomBookings::Status)
                            .text()
                            .not_null()
                            .default("RESERVED"),
                    )
                    .col(ColumnDef::new(RoomBookings::RatePerHour).double().null())
                    .col(
                        ColumnDef::new(RoomBookings::Amount)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(RoomBookings::BookedBy).text().null())
                    .col(ColumnDef::new(RoomBookings::GuestName).text().null())
                    .col(ColumnDef::new(RoomBookings::Purpose).text().null())
                    .col(
                        ColumnDef::new(RoomBookings::Adults)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(RoomBookings::Children)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RoomBookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(RoomBookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_bookings_tenant_id")
                            .from(RoomBookings::Table, RoomBookings::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_bookings_room_id")
                            .from(RoomBookings::Table, RoomBookings::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Conflict scans filter by room and holding status over a time range.
        manager
            .get_connection()
            .execute(Statement::from_string(
                manager.get_database_backend(),
                "CREATE INDEX IF NOT EXISTS idx_room_bookings_room_status_start ON room_bookings (room_id, status, start_at)".to_string(),
            ))
            .await?;

        // Tenant listings order by start_at.
        manager
            .create_index(
                Index::create()
                    .name("idx_room_bookings_tenant_start")
                    .table(RoomBookings::Table)
                    .col(RoomBookings::TenantId)
                    .col(RoomBookings::StartAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_room_bookings_room_status_start")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_room_bookings_tenant_start")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(RoomBookings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RoomBookings {
    Table,
    Id,
    TenantId,
    RoomId,
    StartAt,
    EndAt,
    Status,
    RatePerHour,
    Amount,
    BookedBy,
    GuestName,
    Purpose,
    Adults,
    Children,
    CreatedAt,
    UpdatedAt,
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
