use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CheckoutItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CheckoutItems::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CheckoutItems::CheckoutId).uuid().not_null())
                    // No foreign key on product_id: the snapshot of a sale must
                    // survive catalog deletions.
                    .col(ColumnDef::new(CheckoutItems::ProductId).uuid().not_null())
                    .col(ColumnDef::new(CheckoutItems::Size).string_len(50).null())
                    .col(
                        ColumnDef::new(CheckoutItems::Quantity)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CheckoutItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_checkout_items_checkout_id")
                            .from(CheckoutItems::Table, CheckoutItems::CheckoutId)
                            .to(
                                super::m20260410_000003_create_checkouts_table::Checkouts::Table,
                                super::m20260410_000003_create_checkouts_table::Checkouts::Id,
                            )
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_checkout_items_checkout_id")
                    .table(CheckoutItems::Table)
                    .col(CheckoutItems::CheckoutId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CheckoutItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CheckoutItems {
    Table,
    Id,
    CheckoutId,
    ProductId,
    Size,
    Quantity,
    CreatedAt,
}
