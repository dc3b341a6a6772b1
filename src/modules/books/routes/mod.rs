//! HTTP handlers for the books module.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookapi_http::error::AppError;
use serde_json::json;
use utoipa::OpenApi;

use super::models::{Book, BookInput};
use super::store::{BookStore, StoreError};

pub const DELETED_MESSAGE: &str = "Book deleted successfully!";

#[derive(OpenApi)]
#[openapi(
    paths(list_books, create_book, get_book, update_book, delete_book, health_check),
    components(schemas(Book, BookInput)),
    tags((name = "Books", description = "Book record management"))
)]
pub struct BooksApi;

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        AppError::Internal(error.into())
    }
}

/// Router for the books module, relative to its mount path.
pub fn router(store: BookStore) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(store)
}

fn not_found(id: i64) -> AppError {
    AppError::not_found_with(
        vec![json!({ "id": id })],
        format!("Book not found with ID: {}", id),
    )
}

/// List all books
#[utoipa::path(
    get,
    path = "/",
    tag = "Books",
    responses(
        (status = 200, description = "All stored books", body = [Book]),
        (status = 500, description = "Storage fault")
    )
)]
async fn list_books(State(store): State<BookStore>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(store.list().await?))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/",
    tag = "Books",
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Malformed body"),
        (status = 500, description = "Storage fault")
    )
)]
async fn create_book(
    State(store): State<BookStore>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Json(input) = payload?;
    let book = store.create(input).await?;

    tracing::info!(book_id = book.id, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

/// Fetch a book by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Books",
    params(("id" = i64, Path, description = "Book identity")),
    responses(
        (status = 200, description = "The book", body = Book),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No book with this id"),
        (status = 500, description = "Storage fault")
    )
)]
async fn get_book(
    State(store): State<BookStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(id) = id?;
    store.get(id).await?.map(Json).ok_or_else(|| not_found(id))
}

/// Replace every field of a book
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Books",
    params(("id" = i64, Path, description = "Book identity")),
    request_body = BookInput,
    responses(
        (status = 200, description = "The updated book", body = Book),
        (status = 400, description = "Malformed id or body"),
        (status = 404, description = "No book with this id"),
        (status = 500, description = "Storage fault")
    )
)]
async fn update_book(
    State(store): State<BookStore>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(id) = id?;
    let Json(input) = payload?;

    let book = store.update(id, input).await?.ok_or_else(|| not_found(id))?;
    tracing::info!(book_id = id, "book updated");
    Ok(Json(book))
}

/// Delete a book; succeeds whether or not it existed
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Books",
    params(("id" = i64, Path, description = "Book identity")),
    responses(
        (status = 200, description = "Confirmation text", body = String, content_type = "text/plain"),
        (status = 400, description = "Malformed id"),
        (status = 500, description = "Storage fault")
    )
)]
async fn delete_book(
    State(store): State<BookStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<&'static str, AppError> {
    let Path(id) = id?;
    let removed = store.delete(id).await?;

    tracing::info!(book_id = id, removed, "book delete requested");
    Ok(DELETED_MESSAGE)
}

/// Books module health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "Books",
    responses(
        (status = 200, description = "Module and store are reachable", body = String, content_type = "text/plain"),
        (status = 500, description = "Store unreachable")
    )
)]
async fn health_check(State(store): State<BookStore>) -> Result<&'static str, AppError> {
    store.ping().await?;
    Ok("books module is healthy")
}
