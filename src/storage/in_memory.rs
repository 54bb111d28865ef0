use super::backend::{ObjectStore, ObjectStream};
use crate::types::{ListDirPage, ObjectMetadata, ObjectSummary, error::StoreError};
use bytes::Bytes;
use futures::stream;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const DEFAULT_PAGE_SIZE: usize = 1000;

/// In-memory store backend for testing/development
///
/// Emulates delimited (`delimiter = "/"`) listing over a flat key map,
/// including continuation-token pagination, so the enumerator can be
/// exercised without a live bucket.
#[derive(Clone)]
pub struct InMemoryStore {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
    page_size: usize,
}

#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    metadata: ObjectMetadata,
}

enum ListItem {
    Dir(String),
    Object(ObjectSummary),
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Test hook: smaller pages force the enumerator through continuations
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            page_size: page_size.max(1),
        }
    }

    /// Seed an object (this service never writes through the trait)
    pub async fn put(&self, key: &str, data: Bytes) {
        let metadata = ObjectMetadata {
            key: key.to_string(),
            size: data.len() as u64,
            etag: Self::calculate_etag(&data),
            last_modified: chrono::Utc::now(),
            content_type: "binary/octet-stream".to_string(),
        };

        let mut objects = self.objects.write().await;
        objects.insert(key.to_string(), StoredObject { data, metadata });
    }

    fn calculate_etag(data: &[u8]) -> String {
        use sha2::{Digest, Sha256};
        let hash = Sha256::digest(data);
        format!("\"{}\"", hex::encode(hash))
    }
}

#[async_trait::async_trait]
impl ObjectStore for InMemoryStore {
    async fn list_dir(
        &self,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<ListDirPage, StoreError> {
        let objects = self.objects.read().await;

        let mut keys: Vec<&String> = objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .collect();
        keys.sort();

        // Roll matching keys up into common prefixes and direct objects,
        // in key order, the way a delimited store listing does.
        let mut items: Vec<ListItem> = Vec::new();
        let mut last_common_prefix: Option<String> = None;
        for key in keys {
            let rest = &key[prefix.len()..];
            if let Some(pos) = rest.find('/') {
                let common = format!("{}{}", prefix, &rest[..=pos]);
                if last_common_prefix.as_deref() != Some(common.as_str()) {
                    last_common_prefix = Some(common.clone());
                    items.push(ListItem::Dir(common));
                }
            } else {
                let meta = &objects[key].metadata;
                items.push(ListItem::Object(ObjectSummary {
                    key: key.clone(),
                    size: Some(meta.size as i64),
                    last_modified: Some(meta.last_modified),
                }));
            }
        }

        let start: usize = match continuation {
            Some(token) => token
                .parse()
                .map_err(|_| StoreError::ListFailed(format!("bad continuation token: {}", token)))?,
            None => 0,
        };
        let start = start.min(items.len());
        let end = (start + self.page_size).min(items.len());
        let is_truncated = end < items.len();

        let mut page = ListDirPage {
            is_truncated,
            next_continuation_token: is_truncated.then(|| end.to_string()),
            ..Default::default()
        };
        for item in items.drain(..).skip(start).take(end - start) {
            match item {
                ListItem::Dir(common) => page.common_prefixes.push(common),
                ListItem::Object(summary) => page.objects.push(summary),
            }
        }

        Ok(page)
    }

    async fn get_object(&self, key: &str) -> Result<(ObjectStream, ObjectMetadata), StoreError> {
        let objects = self.objects.read().await;

        let obj = objects.get(key).ok_or(StoreError::NoSuchKey)?;

        let data = obj.data.clone();
        let metadata = obj.metadata.clone();

        // Convert Bytes to a stream with a single item
        let stream: ObjectStream = Box::pin(stream::once(async { Ok(data) }));

        Ok((stream, metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_put_and_get_object() {
        let storage = InMemoryStore::new();
        let key = "test-key";
        let data = Bytes::from("Hello, World!");

        storage.put(key, data.clone()).await;

        let (mut stream, metadata) = storage.get_object(key).await.unwrap();
        assert_eq!(metadata.key, key);
        assert_eq!(metadata.size, data.len() as u64);

        let mut collected = Vec::new();
        while let Some(result) = stream.next().await {
            collected.extend_from_slice(&result.unwrap());
        }
        assert_eq!(collected, data);
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let storage = InMemoryStore::new();
        assert!(matches!(
            storage.get_object("nonexistent").await,
            Err(StoreError::NoSuchKey)
        ));
    }

    #[tokio::test]
    async fn test_list_dir_rolls_up_common_prefixes() {
        let storage = InMemoryStore::new();

        storage.put("photos/a.jpg", Bytes::from("1")).await;
        storage.put("photos/b.jpg", Bytes::from("2")).await;
        storage.put("docs/c.pdf", Bytes::from("3")).await;
        storage.put("readme.txt", Bytes::from("4")).await;

        let page = storage.list_dir("", None).await.unwrap();
        assert_eq!(page.common_prefixes, vec!["docs/", "photos/"]);
        assert_eq!(page.objects.len(), 1);
        assert_eq!(page.objects[0].key, "readme.txt");
        assert!(!page.is_truncated);
    }

    #[tokio::test]
    async fn test_list_dir_under_prefix() {
        let storage = InMemoryStore::new();

        storage.put("photos/2021/a.jpg", Bytes::from("1")).await;
        storage.put("photos/b.jpg", Bytes::from("2")).await;
        storage.put("docs/c.pdf", Bytes::from("3")).await;

        let page = storage.list_dir("photos/", None).await.unwrap();
        assert_eq!(page.common_prefixes, vec!["photos/2021/"]);
        assert_eq!(page.objects.len(), 1);
        assert_eq!(page.objects[0].key, "photos/b.jpg");
    }

    #[tokio::test]
    async fn test_list_dir_paginates() {
        let storage = InMemoryStore::with_page_size(2);

        for i in 0..5 {
            storage
                .put(&format!("file-{}.txt", i), Bytes::from("x"))
                .await;
        }

        let first = storage.list_dir("", None).await.unwrap();
        assert!(first.is_truncated);
        assert_eq!(first.objects.len(), 2);

        let second = storage
            .list_dir("", first.next_continuation_token)
            .await
            .unwrap();
        assert!(second.is_truncated);
        assert_eq!(second.objects[0].key, "file-2.txt");

        let third = storage
            .list_dir("", second.next_continuation_token)
            .await
            .unwrap();
        assert!(!third.is_truncated);
        assert_eq!(third.objects.len(), 1);
        assert!(third.next_continuation_token.is_none());
    }
}
