use crate::app_state::AppState;
use crate::listing::{OUTPUT_FILE_NAME, list_dir, render_listing};
use crate::storage::ObjectStore;
use crate::types::error::StoreError;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use std::sync::Arc;

/// Query parameters for the listing page
#[derive(Deserialize)]
pub struct ListingQuery {
    entry: Option<u64>,
}

/// What a listing request resolves to: a synthesized document, or "let the
/// origin object answer this" (a real object, or a genuine 404)
enum ListingOutcome {
    Document(String),
    Passthrough,
}

/// GET * - synthesize a directory index, or fall through to the object itself
pub async fn serve_path(
    Query(params): Query<ListingQuery>,
    State(app_state): State<AppState>,
    uri: Uri,
) -> Result<Response, StoreError> {
    // The browser may have escaped chars like + with %2B. Decode for API
    // based store queries.
    let path = percent_decode_str(uri.path()).decode_utf8_lossy().to_string();
    let entry_offset = params.entry.unwrap_or(0);

    tracing::info!("GET {}: entry_offset={}", path, entry_offset);

    match evaluate(app_state.storage.clone(), &path, entry_offset).await? {
        ListingOutcome::Document(html) => Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/html"),
                (header::CACHE_CONTROL, "max-age=0"),
            ],
            html,
        )
            .into_response()),
        ListingOutcome::Passthrough => proxy_object(&app_state, &path).await,
    }
}

/// Decide between a synthesized listing and passthrough for a decoded path.
///
/// Path-traversal segments short-circuit to passthrough before any store
/// call; a listing that observes zero entries also passes through so a real
/// object at the path is not shadowed by an empty synthetic document.
async fn evaluate(
    store: Arc<dyn ObjectStore>,
    decoded_path: &str,
    entry_offset: u64,
) -> Result<ListingOutcome, StoreError> {
    if decoded_path.contains("..") {
        return Ok(ListingOutcome::Passthrough);
    }

    let dir_key = derive_dir_key(decoded_path);
    let dir_name = dir_key.rsplit('/').next().unwrap_or("").to_string();

    let entries = list_dir(store, &dir_key);
    let listing = render_listing(&dir_name, entries, entry_offset).await?;

    if listing.entries_seen == 0 {
        return Ok(ListingOutcome::Passthrough);
    }

    Ok(ListingOutcome::Document(listing.html))
}

/// Derive the logical directory key from a decoded URI path
fn derive_dir_key(path: &str) -> String {
    if path.ends_with('/') {
        path.trim_end_matches('/').to_string()
    } else if path.ends_with(OUTPUT_FILE_NAME) {
        // Strip off index.html and the preceding separator
        path.rsplit_once('/')
            .map(|(dir, _)| dir)
            .unwrap_or(path)
            .to_string()
    } else {
        path.to_string()
    }
}

/// Stream the object at the decoded path straight from the store, with its
/// native metadata headers. Missing keys surface as the store's own 404.
async fn proxy_object(app_state: &AppState, decoded_path: &str) -> Result<Response, StoreError> {
    let key = decoded_path.trim_start_matches('/');
    if key.is_empty() {
        return Err(StoreError::NoSuchKey);
    }

    let (stream, metadata) = app_state.storage.get_object(key).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, metadata.content_type.clone()),
            (header::ETAG, metadata.etag.clone()),
            (
                header::LAST_MODIFIED,
                metadata.last_modified.to_rfc2822().replace("+0000", "GMT"),
            ),
            (header::CONTENT_LENGTH, metadata.size.to_string()),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{InMemoryStore, ObjectStream};
    use crate::types::{ListDirPage, ObjectMetadata};
    use bytes::Bytes;

    /// Store that fails every call; proves short-circuit paths never hit it
    struct BrokenStore;

    #[async_trait::async_trait]
    impl ObjectStore for BrokenStore {
        async fn list_dir(
            &self,
            _prefix: &str,
            _continuation: Option<String>,
        ) -> Result<ListDirPage, StoreError> {
            Err(StoreError::ListFailed("should not be called".to_string()))
        }

        async fn get_object(
            &self,
            _key: &str,
        ) -> Result<(ObjectStream, ObjectMetadata), StoreError> {
            Err(StoreError::NoSuchKey)
        }
    }

    #[test]
    fn test_derive_dir_key() {
        assert_eq!(derive_dir_key("/a/b/"), "/a/b");
        assert_eq!(derive_dir_key("/a/b/index.html"), "/a/b");
        assert_eq!(derive_dir_key("/a/b"), "/a/b");
        assert_eq!(derive_dir_key("/"), "");
        assert_eq!(derive_dir_key("/index.html"), "");
    }

    #[tokio::test]
    async fn test_traversal_passes_through_before_any_store_call() {
        let outcome = evaluate(Arc::new(BrokenStore), "/foo/../bar", 0)
            .await
            .unwrap();
        assert!(matches!(outcome, ListingOutcome::Passthrough));
    }

    #[tokio::test]
    async fn test_zero_entries_pass_through() {
        let store = Arc::new(InMemoryStore::new());
        store.put("real-object.bin", Bytes::from("data")).await;

        let outcome = evaluate(store, "/real-object.bin/", 0).await.unwrap();
        assert!(matches!(outcome, ListingOutcome::Passthrough));
    }

    #[tokio::test]
    async fn test_dir_with_only_index_html_passes_through() {
        let store = Arc::new(InMemoryStore::new());
        store.put("docs/index.html", Bytes::from("<html>")).await;

        let outcome = evaluate(store, "/docs/", 0).await.unwrap();
        assert!(matches!(outcome, ListingOutcome::Passthrough));
    }

    #[tokio::test]
    async fn test_populated_dir_yields_document() {
        let store = Arc::new(InMemoryStore::new());
        store.put("docs/a.txt", Bytes::from("1")).await;

        let outcome = evaluate(store, "/docs/", 0).await.unwrap();
        match outcome {
            ListingOutcome::Document(html) => assert!(html.contains("a.txt")),
            ListingOutcome::Passthrough => panic!("expected a document"),
        }
    }

    #[tokio::test]
    async fn test_enumeration_failure_propagates() {
        let result = evaluate(Arc::new(BrokenStore), "/docs/", 0).await;
        assert!(matches!(result, Err(StoreError::ListFailed(_))));
    }
}
