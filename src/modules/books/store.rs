//! Record store for books.
//!
//! Absence is reported as `None` (or `false` for deletes); only genuine
//! storage faults surface as [`StoreError`].

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, DatabaseConnection, DbErr, EntityTrait, QueryOrder,
    Set,
};
use thiserror::Error;

use super::entity::{self, Entity as BookEntity};
use super::models::{Book, BookInput};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Single-table store backed by the shared connection pool.
#[derive(Clone)]
pub struct BookStore {
    db: DatabaseConnection,
}

impl BookStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All books in ascending id order, which is insertion order.
    pub async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let rows = BookEntity::find()
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<Option<Book>, StoreError> {
        let row = BookEntity::find_by_id(id).one(&self.db).await?;
        Ok(row.map(Book::from))
    }

    pub async fn create(&self, input: BookInput) -> Result<Book, StoreError> {
        let active = entity::ActiveModel {
            id: NotSet,
            title: Set(input.title),
            author: Set(input.author),
            genre: Set(input.genre),
            year: Set(input.year),
            rating: Set(input.rating),
        };
        let row = active.insert(&self.db).await?;

        tracing::debug!(book_id = row.id, "book created");
        Ok(row.into())
    }

    /// Replace every field of book `id`. Returns `None` without touching the
    /// table when no such book exists.
    pub async fn update(&self, id: i64, input: BookInput) -> Result<Option<Book>, StoreError> {
        let active = entity::ActiveModel {
            id: Set(id),
            title: Set(input.title),
            author: Set(input.author),
            genre: Set(input.genre),
            year: Set(input.year),
            rating: Set(input.rating),
        };

        match active.update(&self.db).await {
            Ok(row) => {
                tracing::debug!(book_id = row.id, "book updated");
                Ok(Some(row.into()))
            }
            Err(DbErr::RecordNotUpdated) | Err(DbErr::RecordNotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove book `id`. Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = BookEntity::delete_by_id(id).exec(&self.db).await?;
        let removed = result.rows_affected > 0;

        tracing::debug!(book_id = id, removed, "book delete");
        Ok(removed)
    }

    /// Cheap round-trip used by the module health check.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.db.ping().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::test_support::memory_store;

    fn dune() -> BookInput {
        BookInput {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            genre: "Sci-Fi".to_string(),
            year: 1965,
            rating: 4.8,
        }
    }

    fn neuromancer() -> BookInput {
        BookInput {
            title: "Neuromancer".to_string(),
            author: "William Gibson".to_string(),
            genre: "Cyberpunk".to_string(),
            year: 1984,
            rating: 4.1,
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips_every_field() {
        let store = memory_store().await;

        let created = store.create(dune()).await.unwrap();
        let fetched = store.get(created.id).await.unwrap().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Dune");
        assert_eq!(fetched.author, "Frank Herbert");
        assert_eq!(fetched.genre, "Sci-Fi");
        assert_eq!(fetched.year, 1965);
        assert_eq!(fetched.rating, 4.8);
    }

    #[tokio::test]
    async fn get_absent_is_none() {
        let store = memory_store().await;
        assert!(store.get(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_replaces_all_fields_but_id() {
        let store = memory_store().await;
        let created = store.create(dune()).await.unwrap();

        let updated = store
            .update(created.id, neuromancer())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Neuromancer");
        assert_eq!(updated.year, 1984);
        assert_eq!(store.get(created.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn update_absent_is_none_and_leaves_store_unchanged() {
        let store = memory_store().await;
        let existing = store.create(dune()).await.unwrap();

        assert!(store.update(999, neuromancer()).await.unwrap().is_none());

        assert_eq!(store.list().await.unwrap(), vec![existing]);
        assert!(store.get(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = memory_store().await;
        let created = store.create(dune()).await.unwrap();

        assert!(store.delete(created.id).await.unwrap());
        assert!(!store.delete(created.id).await.unwrap());
        assert!(store.get(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_returns_every_created_book_in_id_order() {
        let store = memory_store().await;
        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(store.create(dune()).await.unwrap().id);
        }

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 5);
        assert_eq!(listed.iter().map(|b| b.id).collect::<Vec<_>>(), ids);
        for id in ids {
            assert!(store.get(id).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = memory_store().await;
        let first = store.create(dune()).await.unwrap();
        let second = store.create(neuromancer()).await.unwrap();

        store.delete(second.id).await.unwrap();
        let third = store.create(dune()).await.unwrap();

        assert!(second.id > first.id);
        assert!(third.id > second.id);
    }

    #[tokio::test]
    async fn ratings_and_years_are_unconstrained() {
        let store = memory_store().await;
        let created = store
            .create(BookInput {
                year: -300,
                rating: 17.25,
                ..dune()
            })
            .await
            .unwrap();

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.year, -300);
        assert_eq!(fetched.rating, 17.25);
    }

    #[tokio::test]
    async fn missing_table_is_a_storage_fault() {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        let store = BookStore::new(db);

        assert!(matches!(store.list().await, Err(StoreError::Database(_))));
        assert!(store.ping().await.is_ok());
    }
}
