pub use sea_orm_migration::prelude::*;

mod m20260410_000001_create_products_table;
mod m20260410_000002_create_deliveries_table;
mod m20260410_000003_create_checkouts_table;
mod m20260410_000004_create_checkout_items_table;
mod m20260410_000005_create_notifications_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260410_000001_create_products_table::Migration),
            Box::new(m20260410_000002_create_deliveries_table::Migration),
            Box::new(m20260410_000003_create_checkouts_table::Migration),
            Box::new(m20260410_000004_create_checkout_items_table::Migration),
            Box::new(m20260410_000005_create_notifications_table::Migration),
        ]
    }
}
