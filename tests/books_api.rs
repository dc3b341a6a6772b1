use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use bookapi_app::{modules::books::models::Book, Application};
use bookapi_kernel::settings::Settings;
use serde::de::DeserializeOwned;
use serde_json::json;
use tower::ServiceExt;

fn settings_for(url: String) -> Settings {
    let mut settings = Settings::default();
    settings.database.url = url;
    settings
}

async fn memory_app() -> (Application, Router) {
    let app = Application::bootstrap(settings_for("sqlite::memory:".to_string()))
        .await
        .expect("failed to bootstrap application");
    let router = app.router();
    (app, router)
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> Response {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap()
}

async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn read_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn dune_lifecycle() {
    let (app, router) = memory_app().await;

    let response = send(
        &router,
        "POST",
        "/books",
        Some(json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "genre": "Sci-Fi",
            "year": 1965,
            "rating": 4.8
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Book = read_json(response).await;
    assert_eq!(
        created,
        Book {
            id: 1,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            genre: "Sci-Fi".to_string(),
            year: 1965,
            rating: 4.8,
        }
    );

    let response = send(&router, "GET", "/books/1", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Book = read_json(response).await;
    assert_eq!(fetched, created);

    let response = send(
        &router,
        "PUT",
        "/books/1",
        Some(json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "genre": "Sci-Fi",
            "year": 1965,
            "rating": 5.0
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Book = read_json(response).await;
    assert_eq!(updated, Book { rating: 5.0, ..created.clone() });

    let response = send(&router, "DELETE", "/books/1", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_text(response).await, "Book deleted successfully!");

    let response = send(&router, "GET", "/books/1", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn list_contains_every_created_book() {
    let (app, router) = memory_app().await;

    for n in 0..4 {
        let response = send(
            &router,
            "POST",
            "/books",
            Some(json!({
                "title": format!("Volume {}", n),
                "author": "Anon",
                "genre": "Essay",
                "year": 2000 + n,
                "rating": 3.5
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(&router, "GET", "/books", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let books: Vec<Book> = read_json(response).await;
    assert_eq!(books.len(), 4);

    for book in books {
        let response = send(&router, "GET", &format!("/books/{}", book.id), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let fetched: Book = read_json(response).await;
        assert_eq!(fetched, book);
    }

    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn form_style_string_numbers_are_coerced() {
    let (app, router) = memory_app().await;

    let response = send(
        &router,
        "POST",
        "/books",
        Some(json!({
            "id": "",
            "title": "Kindred",
            "author": "Octavia E. Butler",
            "genre": "Fiction",
            "year": "1979",
            "rating": "4.6"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Book = read_json(response).await;
    assert_eq!(created.year, 1979);
    assert_eq!(created.rating, 4.6);

    // Unfilled form fields arrive as blank strings
    let response = send(
        &router,
        "POST",
        "/books",
        Some(json!({
            "title": "T",
            "author": "A",
            "genre": "",
            "year": "",
            "rating": ""
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let blank: Book = read_json(response).await;
    assert_eq!(blank.genre, "");
    assert_eq!(blank.year, 0);
    assert_eq!(blank.rating, 0.0);

    let response = send(&router, "GET", &format!("/books/{}", blank.id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Book = read_json(response).await;
    assert_eq!(fetched, blank);

    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn service_routes_are_mounted() {
    let (app, router) = memory_app().await;

    let response = send(&router, "GET", "/healthz", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&router, "GET", "/books/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let response = send(&router, "GET", "/docs/openapi.json", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let spec: serde_json::Value = read_json(response).await;
    assert!(spec["paths"]["/books"]["get"].is_object());
    assert!(spec["paths"]["/books/{id}"]["put"].is_object());
    assert!(spec["components"]["schemas"]["Book"].is_object());

    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn books_survive_restart_on_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("books.db").display());

    let app = Application::bootstrap(settings_for(url.clone())).await.unwrap();
    let router = app.router();
    let response = send(
        &router,
        "POST",
        "/books",
        Some(json!({
            "title": "Solaris",
            "author": "Stanislaw Lem",
            "genre": "Sci-Fi",
            "year": 1961,
            "rating": 4.3
        })),
    )
    .await;
    let created: Book = read_json(response).await;
    app.shutdown().await.unwrap();

    let app = Application::bootstrap(settings_for(url)).await.unwrap();
    let router = app.router();
    let response = send(&router, "GET", &format!("/books/{}", created.id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Book = read_json(response).await;
    assert_eq!(fetched, created);

    app.shutdown().await.unwrap();
}
