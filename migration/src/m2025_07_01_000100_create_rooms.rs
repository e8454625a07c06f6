//! Migration to create the rooms table.
//!
//! One row per inventory unit. Room status fields are written only by the
//! lifecycle controller; `name` is unique per tenant.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rooms::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Rooms::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Rooms::Name).text().not_null())
                    .col(
                        ColumnDef::new(Rooms::Status)
                            .text()
                            .not_null()
                            .default("AVAILABLE"),
                    )
                    .col(
                        ColumnDef::new(Rooms::HousekeepingStatus)
                            .text()
                            .not_null()
                            .default("CLEAN"),
                    )
                    .col(
                        ColumnDef::new(Rooms::OutOfOrder)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Rooms::BaseRate)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Rooms::InspectedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Rooms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Rooms::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rooms_tenant_id")
                            .from(Rooms::Table, Rooms::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Room names are unique within a tenant, never globally.
        manager
            .create_index(
                Index::create()
                    .name("idx_rooms_tenant_name")
                    .table(Rooms::Table)
                    .col(Rooms::TenantId)
                    .col(Rooms::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rooms_tenant_status")
                    .table(Rooms::Table)
                    .col(Rooms::TenantId)
                    .col(Rooms::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_rooms_tenant_name").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_rooms_tenant_status").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Rooms::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Rooms {
    Table,
    Id,
    TenantId,
    Name,
    Status,
    HousekeepingStatus,
    OutOfOrder,
    BaseRate,
    InspectedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
}
