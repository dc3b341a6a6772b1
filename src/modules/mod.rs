pub mod books;

use bookapi_kernel::ModuleRegistry;
use sea_orm::DatabaseConnection;

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, db: &DatabaseConnection) {
    registry.register(books::create_module(db.clone()));
}
