//! Database connection factory and schema bootstrap.

use std::time::Duration;

use anyhow::Context;
use bookapi_kernel::settings::DatabaseSettings;
use bookapi_kernel::Migration;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};

/// Open a connection pool for the configured database URL.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(settings.url.clone());
    options
        .connect_timeout(Duration::from_millis(settings.connect_timeout_ms))
        .sqlx_logging(settings.log_statements);

    // Every pooled connection to an in-memory SQLite database sees its own
    // empty database, so the pool must hold exactly one.
    if is_in_memory(&settings.url) {
        options.max_connections(1).min_connections(1);
    } else {
        options.max_connections(settings.max_connections);
    }

    let db = Database::connect(options)
        .await
        .with_context(|| "failed to connect to database")?;

    tracing::info!(
        target: "bookapi-db",
        backend = ?db.get_database_backend(),
        "database connection established"
    );

    Ok(db)
}

/// Execute module schema statements in the given order.
///
/// Statements are expected to be idempotent; nothing records which ones ran.
pub async fn apply_schema(
    db: &DatabaseConnection,
    migrations: &[(String, Migration)],
) -> anyhow::Result<()> {
    for (module, migration) in migrations {
        tracing::info!(
            target: "bookapi-db",
            module = %module,
            migration = migration.id,
            "applying schema"
        );

        db.execute_unprepared(migration.up).await.with_context(|| {
            format!(
                "failed to apply schema '{}' for module '{}'",
                migration.id, module
            )
        })?;
    }

    Ok(())
}

/// Round-trip to the database to confirm it is reachable.
pub async fn ping(db: &DatabaseConnection) -> anyhow::Result<()> {
    db.ping().await.with_context(|| "database ping failed")
}

/// Close the pool, waiting for checked-out connections to be returned.
pub async fn close(db: DatabaseConnection) -> anyhow::Result<()> {
    db.close()
        .await
        .with_context(|| "failed to close database connection")?;
    tracing::info!(target: "bookapi-db", "database connection closed");
    Ok(())
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
