/// Metadata for a single stored object, as reported by HEAD/GET calls
#[derive(Debug, Clone)]
pub struct ObjectMetadata {
    pub key: String,
    pub size: u64,
    pub etag: String,
    pub last_modified: chrono::DateTime<chrono::Utc>,
    pub content_type: String,
}

/// Summary line for one object inside a delimited listing page
///
/// Size and timestamp are optional because the store reports them as such;
/// the renderer treats an object entry missing either as unrenderable.
#[derive(Debug, Clone)]
pub struct ObjectSummary {
    pub key: String,
    pub size: Option<i64>,
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,
}

/// One page of a delimited ListObjectsV2-style call
#[derive(Debug, Clone, Default)]
pub struct ListDirPage {
    pub common_prefixes: Vec<String>,
    pub objects: Vec<ObjectSummary>,
    pub is_truncated: bool,
    pub next_continuation_token: Option<String>,
}
