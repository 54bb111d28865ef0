use crate::types::{ListDirPage, ObjectMetadata, error::StoreError};
use bytes::Bytes;
use futures::stream::Stream;
use std::pin::Pin;

/// Streaming object body
pub type ObjectStream = Pin<Box<dyn Stream<Item = Result<Bytes, StoreError>> + Send>>;

/// Object store trait - implement this for different storage backends
///
/// The store is read-only from this service's point of view: one delimited
/// listing call and one object fetch are all the listing pipeline needs.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch one page of a delimited (`delimiter = "/"`) listing under `prefix`.
    ///
    /// An empty `prefix` lists the bucket root. `continuation` is the opaque
    /// token returned by the previous page, or `None` for the first page.
    async fn list_dir(
        &self,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<ListDirPage, StoreError>;

    /// Fetch an object body as a stream, together with its metadata.
    async fn get_object(&self, key: &str) -> Result<(ObjectStream, ObjectMetadata), StoreError>;
}
