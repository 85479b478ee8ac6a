use crate::config::DatabaseConfig;
use crate::error::AppResult;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

pub async fn create_connection(config: &DatabaseConfig) -> AppResult<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let conn = Database::connect(options).await?;
    Ok(conn)
}

pub async fn run_migrations(conn: &DatabaseConnection) -> AppResult<()> {
    migration::Migrator::up(conn, None).await?;
    Ok(())
}
