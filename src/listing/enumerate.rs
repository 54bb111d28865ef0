use crate::listing::entry::Entry;
use crate::storage::ObjectStore;
use crate::types::error::StoreError;
use futures::stream::{self, Stream, TryStreamExt};
use std::sync::Arc;

/// Turn a logical directory path into a store prefix. The empty, `.` and `/`
/// sentinels mean the bucket root (no prefix filter); anything else gets a
/// single trailing delimiter.
pub fn normalize_prefix(dir_path: &str) -> String {
    let trimmed = dir_path.trim_start_matches('/');
    if trimmed.is_empty() || trimmed == "." {
        String::new()
    } else {
        format!("{}/", trimmed.trim_end_matches('/'))
    }
}

struct PageState {
    store: Arc<dyn ObjectStore>,
    prefix: String,
    continuation: Option<String>,
    done: bool,
}

/// Lazily enumerate one logical directory as a stream of entries.
///
/// Pages are fetched only as the consumer pulls past the previous one, so
/// memory is bounded by a single listing page. Per page, common-prefix
/// (directory) entries come before object entries; an object whose key equals
/// the prefix itself is a directory marker, not a real file, and is dropped.
///
/// A failed store call terminates the stream with a single `Err`; there is no
/// partial silent success and the stream is not restartable.
pub fn list_dir(
    store: Arc<dyn ObjectStore>,
    dir_path: &str,
) -> impl Stream<Item = Result<Entry, StoreError>> {
    let state = PageState {
        store,
        prefix: normalize_prefix(dir_path),
        continuation: None,
        done: false,
    };

    stream::try_unfold(state, |mut state| async move {
        if state.done {
            return Ok(None);
        }

        let page = state
            .store
            .list_dir(&state.prefix, state.continuation.take())
            .await?;

        let mut entries: Vec<Result<Entry, StoreError>> = Vec::new();
        for common_prefix in page.common_prefixes {
            entries.push(Ok(Entry::directory(&common_prefix)));
        }
        for object in page.objects {
            if object.key == state.prefix {
                // directory marker object created for this prefix
                continue;
            }
            entries.push(Ok(Entry::object(object)));
        }

        state.continuation = page.next_continuation_token;
        state.done = !page.is_truncated || state.continuation.is_none();

        Ok(Some((stream::iter(entries), state)))
    })
    .try_flatten()
}
