pub mod entity;
pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::Router;
use bookapi_kernel::{InitCtx, Migration, Module};
use sea_orm::DatabaseConnection;
use utoipa::OpenApi;

use store::BookStore;

/// `AUTOINCREMENT` keeps SQLite from handing out the id of a deleted row again.
const MIGRATIONS: [Migration; 1] = [Migration {
    id: "001_create_books",
    up: r#"
        CREATE TABLE IF NOT EXISTS books (
            id     INTEGER PRIMARY KEY AUTOINCREMENT,
            title  TEXT    NOT NULL,
            author TEXT    NOT NULL,
            genre  TEXT    NOT NULL,
            year   INTEGER NOT NULL,
            rating REAL    NOT NULL
        );
        "#,
}];

/// Book records over HTTP, mounted at `/books`.
pub struct BooksModule {
    store: BookStore,
}

impl BooksModule {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            store: BookStore::new(db),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.store
            .ping()
            .await
            .context("books store is unreachable")?;

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        match serde_json::to_value(routes::BooksApi::openapi()) {
            Ok(spec) => Some(spec),
            Err(e) => {
                tracing::warn!(module = self.name(), error = %e, "failed to render OpenAPI fragment");
                None
            }
        }
    }

    fn migrations(&self) -> Vec<Migration> {
        MIGRATIONS.to_vec()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(db: DatabaseConnection) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(db))
}


#[cfg(test)]
mod tests {
    use super::*;
    use bookapi_kernel::settings::Settings;

    #[tokio::test]
    async fn module_contributes_schema_routes_and_docs() {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        let module = BooksModule::new(db.clone());

        assert_eq!(module.name(), "books");
        assert_eq!(module.mount_path(), "/books");
        assert_eq!(module.migrations().len(), 1);

        let spec = module.openapi().unwrap();
        assert!(spec["paths"]["/{id}"].is_object());

        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
            db: &db,
        };
        module.init(&ctx).await.unwrap();
    }
}
