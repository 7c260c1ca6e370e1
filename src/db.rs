use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement,
};

use crate::error::AppResult;

pub async fn connect_and_migrate(database_url: &str) -> AppResult<DatabaseConnection> {
    let mut opts = ConnectOptions::new(database_url);
    opts.sqlx_logging(false);
    // Every pooled connection to `:memory:` would open its own empty database.
    if database_url.contains(":memory:") {
        opts.max_connections(1).min_connections(1);
    }

    let db = Database::connect(opts).await?;

    if db.get_database_backend() == DatabaseBackend::Sqlite {
        // WAL is recorded in the database file, so one connection setting it covers the pool.
        db.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "PRAGMA journal_mode=WAL".to_string(),
        ))
        .await?;
    }

    Migrator::up(&db, None).await?;
    tracing::debug!("database schema is up to date");

    Ok(db)
}

#[cfg(test)]
pub async fn test_db() -> DatabaseConnection {
    connect_and_migrate("sqlite::memory:").await.expect("in-memory database")
}
