use migrations::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DbErr};
use std::time::Duration;
use tracing::{error, info};

/// Standalone migration runner.
///
/// Applies the schema from the `migrations` workspace member so the server
/// and this binary can never disagree about table shapes.
///
/// Usage: `migration [up|down|fresh|status]` (defaults to `up`).
#[tokio::main]
async fn main() -> Result<(), DbErr> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let command = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://storefront.db?mode=rwc".to_string());

    info!("Connecting to database: {}", database_url);

    let mut options = ConnectOptions::new(database_url);
    options
        .max_connections(5)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true);

    let db = Database::connect(options).await?;

    match command.as_str() {
        "up" => {
            info!("Applying pending migrations");
            Migrator::up(&db, None).await?;
            info!("Migrations applied successfully");
        }
        "down" => {
            info!("Rolling back the most recent migration");
            Migrator::down(&db, Some(1)).await?;
            info!("Rollback completed successfully");
        }
        "fresh" => {
            info!("Dropping all tables and reapplying every migration");
            Migrator::fresh(&db).await?;
            info!("Schema recreated successfully");
        }
        "status" => {
            Migrator::status(&db).await?;
        }
        other => {
            error!(
                "Unknown command '{}'; expected one of: up, down, fresh, status",
                other
            );
            std::process::exit(1);
        }
    }

    Ok(())
}
