//! Book API application library
//!
//! Wires the application modules onto the kernel, database and HTTP layers.

use std::future::Future;

use anyhow::Context;
use axum::Router;
use bookapi_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use sea_orm::DatabaseConnection;

pub mod modules;

/// A bootstrapped application: settings, database pool and started modules.
pub struct Application {
    settings: Settings,
    db: DatabaseConnection,
    registry: ModuleRegistry,
}

impl Application {
    /// Connect to the database, apply module schema, then initialize and
    /// start every module.
    pub async fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        let db = bookapi_db::connect(&settings.database).await?;

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &db);

        bookapi_db::apply_schema(&db, &registry.collect_migrations())
            .await
            .context("failed to apply module schema")?;

        let ctx = InitCtx {
            settings: &settings,
            db: &db,
        };
        registry.init_modules(&ctx).await?;
        registry.start_modules(&ctx).await?;

        tracing::info!(modules = registry.len(), "application bootstrap complete");

        Ok(Self {
            settings,
            db,
            registry,
        })
    }

    /// Connect and apply module schema without starting anything.
    pub async fn init_database(settings: &Settings) -> anyhow::Result<()> {
        let db = bookapi_db::connect(&settings.database).await?;

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &db);

        bookapi_db::apply_schema(&db, &registry.collect_migrations())
            .await
            .context("failed to apply module schema")?;

        bookapi_db::close(db).await
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// The fully layered router, without binding a socket.
    pub fn router(&self) -> Router {
        bookapi_http::build_router(&self.registry, &self.settings)
    }

    /// Serve HTTP until `shutdown` resolves, then stop modules and release
    /// the database pool.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let served = bookapi_http::start_server(&self.registry, &self.settings, shutdown).await;

        self.shutdown().await?;
        served
    }

    /// Stop modules in reverse order and close the database pool.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.registry.stop_modules().await?;
        bookapi_db::close(self.db).await
    }
}
