use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use s3_autoindex::{AppState, InMemoryStore, create_app};
use std::sync::Arc;
use tower::ServiceExt;

/// Build the real application router over a seeded in-memory store.
///
/// The store handle is returned alongside so tests can keep seeding it; it
/// shares state with the clone inside the router.
pub fn test_app() -> (Router, InMemoryStore) {
    test_app_with_page_size(1000)
}

pub fn test_app_with_page_size(page_size: usize) -> (Router, InMemoryStore) {
    let store = InMemoryStore::with_page_size(page_size);
    let app_state = AppState::new(Arc::new(store.clone()));
    (create_app(app_state), store)
}

/// One-shot GET against the router, collecting the full body
pub async fn get(app: &Router, uri: &str) -> (StatusCode, HeaderMap, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status, headers, String::from_utf8_lossy(&body).to_string())
}
