use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Checkouts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Checkouts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Checkouts::FirstName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Checkouts::LastName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Checkouts::Address)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Checkouts::Phone).string_len(50).not_null())
                    .col(ColumnDef::new(Checkouts::City).string_len(100).not_null())
                    .col(ColumnDef::new(Checkouts::Region).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Checkouts::Subtotal)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Checkouts::Total)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Checkouts::DeliveryId).uuid().null())
                    .col(
                        ColumnDef::new(Checkouts::Status)
                            .string_len(32)
                            .not_null()
                            .default("Pending"),
                    )
                    .col(
                        ColumnDef::new(Checkouts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Checkouts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_checkouts_delivery_id")
                            .from(Checkouts::Table, Checkouts::DeliveryId)
                            .to(
                                super::m20260410_000002_create_deliveries_table::Deliveries::Table,
                                super::m20260410_000002_create_deliveries_table::Deliveries::Id,
                            )
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_checkouts_status")
                    .table(Checkouts::Table)
                    .col(Checkouts::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_checkouts_created_at")
                    .table(Checkouts::Table)
                    .col(Checkouts::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Checkouts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Checkouts {
    Table,
    Id,
    FirstName,
    LastName,
    Address,
    Phone,
    City,
    Region,
    Subtotal,
    Total,
    DeliveryId,
    Status,
    CreatedAt,
    UpdatedAt,
}
