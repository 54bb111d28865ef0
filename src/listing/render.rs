use crate::listing::entry::{Entry, pretty_size};
use crate::listing::template;
use crate::types::error::StoreError;
use futures::stream::Stream;
use futures::{TryStreamExt, pin_mut};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// The generated artifact itself; never shown as listing content
pub const OUTPUT_FILE_NAME: &str = "index.html";

/// Rendering stops once the accumulated rows exceed this many bytes
const MAX_BODY_BYTES: usize = 1_000_000;

// Keep path separators and the usual unreserved characters readable in hrefs
const HREF_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

/// The rendered artifact of one listing invocation
pub struct RenderedListing {
    pub html: String,
    /// Entries observed in enumeration order, including ones skipped by the
    /// offset or dropped for missing metadata
    pub entries_seen: u64,
    pub truncated: bool,
}

/// Stream entries into an HTML index document.
///
/// Entries are counted in enumeration order; markup is withheld while the
/// running count is below `entry_offset` (the `?entry=N` linear-skip
/// contract). An entry whose metadata is unusable is logged and dropped
/// without aborting the page, but a failed enumeration aborts the whole
/// invocation. Once the accumulated rows pass the byte cap, a truncation
/// notice linking to the next page is spliced in after the go-up row and no
/// further entries are pulled.
pub async fn render_listing<S>(
    dir_name: &str,
    entries: S,
    entry_offset: u64,
) -> Result<RenderedListing, StoreError>
where
    S: Stream<Item = Result<Entry, StoreError>>,
{
    let mut head = String::with_capacity(
        template::HEADER_PRE_TITLE.len() + template::HEADER_POST_TITLE.len() + dir_name.len(),
    );
    head.push_str(template::HEADER_PRE_TITLE);
    head.push_str(dir_name);
    head.push_str(template::HEADER_POST_TITLE);

    let mut rows = String::new();
    let mut entry_count: u64 = 0;
    let mut truncated = false;

    pin_mut!(entries);
    while let Some(entry) = entries.try_next().await? {
        if entry.name.eq_ignore_ascii_case(OUTPUT_FILE_NAME) {
            continue;
        }

        entry_count += 1;
        if entry_count < entry_offset {
            continue;
        }

        match render_row(&entry) {
            Some(row) => rows.push_str(&row),
            None => {
                tracing::warn!("Skipping entry with missing metadata: {}", entry.absolute);
                continue;
            }
        }

        if rows.len() > MAX_BODY_BYTES {
            head.push_str(&format!(
                "<tr><td></td><td><b>Listing truncated...</b> \
                 <a href=\"?entry={}\">Next Page</a></td><td></td><td></td><td></td></tr>\n",
                entry_count + 1
            ));
            truncated = true;
            break;
        }
    }

    let mut html = head;
    html.push_str(&rows);
    html.push_str(template::FOOTER);

    Ok(RenderedListing {
        html,
        entries_seen: entry_count,
        truncated,
    })
}

/// Render one table row, or `None` when a file entry is missing the size or
/// timestamp metadata it needs.
fn render_row(entry: &Entry) -> Option<String> {
    let mut size_bytes: i64 = -1; // is a folder
    let mut size_pretty = "&mdash;".to_string();
    let mut last_modified_iso = String::new();
    let mut last_modified_human = "-".to_string();

    if entry.is_file() {
        let size = entry.size?;
        let modified = entry.last_modified?;
        size_bytes = size;
        size_pretty = pretty_size(size.max(0) as u64);
        last_modified_iso = modified.to_rfc3339_opts(chrono::SecondsFormat::Secs, false);
        last_modified_human = modified.format("%c").to_string();
    }

    let mut entry_path = entry.name.clone();
    let icon = match (entry.is_dir, entry.is_symlink) {
        (true, false) => {
            // trailing slash keeps relative links working under the prefix
            entry_path.push('/');
            "folder"
        }
        (true, true) => {
            tracing::debug!("dir-symlink {}", entry.absolute);
            "folder-shortcut"
        }
        (false, true) => {
            tracing::debug!("file-symlink {}", entry.absolute);
            "file-shortcut"
        }
        (false, false) => "file",
    };

    let href = utf8_percent_encode(&entry_path, HREF_ENCODE).to_string();

    Some(format!(
        r##"
        <tr class="file">
            <td></td>
            <td>
                <a href="{href}">
                    <svg width="1.5em" height="1em" version="1.1" viewBox="0 0 265 323"><use xlink:href="#{icon}"></use></svg>
                    <span class="name">{name}</span>
                </a>
            </td>
            <td data-order="{size_bytes}">{size_pretty}</td>
            <td class="hideable"><time datetime="{iso}">{human}</time></td>
            <td class="hideable"></td>
        </tr>
"##,
        href = href,
        icon = icon,
        name = entry.name,
        size_bytes = size_bytes,
        size_pretty = size_pretty,
        iso = last_modified_iso,
        human = last_modified_human,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ObjectSummary;
    use futures::stream;

    fn file(name: &str, size: i64) -> Entry {
        Entry::object(ObjectSummary {
            key: format!("top/{}", name),
            size: Some(size),
            last_modified: Some(chrono::Utc::now()),
        })
    }

    fn dir(name: &str) -> Entry {
        Entry::directory(&format!("top/{}/", name))
    }

    async fn render(entries: Vec<Entry>, offset: u64) -> RenderedListing {
        render_listing("top", stream::iter(entries.into_iter().map(Ok)), offset)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_excludes_index_html() {
        let listing = render(
            vec![file("index.html", 10), file("INDEX.HTML", 10), file("a.txt", 10)],
            0,
        )
        .await;

        assert_eq!(listing.entries_seen, 1);
        assert!(!listing.html.contains("index.html"));
        assert!(!listing.html.contains("INDEX.HTML"));
        assert!(listing.html.contains("a.txt"));
    }

    #[tokio::test]
    async fn test_empty_listing_counts_zero() {
        let listing = render(vec![], 0).await;
        assert_eq!(listing.entries_seen, 0);
        assert!(!listing.truncated);
        // the skeleton (go-up row included) is still a full document
        assert!(listing.html.contains("goup"));
        assert!(listing.html.ends_with("</html>"));
    }

    #[tokio::test]
    async fn test_dirs_and_files_render_differently() {
        let listing = render(vec![dir("x"), file("f.txt", 2048)], 0).await;

        assert!(listing.html.contains(r#"<a href="x/">"#));
        assert!(listing.html.contains("#folder"));
        assert!(listing.html.contains(r#"data-order="-1">&mdash;<"#));
        assert!(listing.html.contains(r#"data-order="2048">2 KB<"#));
        assert!(listing.html.contains("#file"));
    }

    #[tokio::test]
    async fn test_href_is_percent_encoded() {
        let listing = render(vec![file("a file+x.txt", 1)], 0).await;
        assert!(listing.html.contains(r#"href="a%20file%2Bx.txt""#));
        // display name is untouched
        assert!(listing.html.contains("<span class=\"name\">a file+x.txt</span>"));
    }

    #[tokio::test]
    async fn test_offset_skips_markup_but_keeps_counting() {
        let entries = (1..=5).map(|i| file(&format!("f{}.txt", i), 1)).collect();
        let listing = render(entries, 3).await;

        assert_eq!(listing.entries_seen, 5);
        assert!(!listing.html.contains("f1.txt"));
        assert!(!listing.html.contains("f2.txt"));
        assert!(listing.html.contains("f3.txt"));
        assert!(listing.html.contains("f4.txt"));
        assert!(listing.html.contains("f5.txt"));
    }

    #[tokio::test]
    async fn test_entry_with_missing_metadata_is_skipped_not_fatal() {
        let broken = Entry::object(ObjectSummary {
            key: "top/broken.txt".to_string(),
            size: None,
            last_modified: None,
        });
        let listing = render(vec![file("ok.txt", 1), broken, file("also-ok.txt", 1)], 0).await;

        assert_eq!(listing.entries_seen, 3);
        assert!(listing.html.contains("ok.txt"));
        assert!(!listing.html.contains("broken.txt"));
        assert!(listing.html.contains("also-ok.txt"));
    }

    #[tokio::test]
    async fn test_enumeration_failure_aborts_rendering() {
        let entries = stream::iter(vec![
            Ok(file("a.txt", 1)),
            Err(StoreError::ListFailed("boom".to_string())),
            Ok(file("b.txt", 1)),
        ]);

        let result = render_listing("top", entries, 0).await;
        assert!(matches!(result, Err(StoreError::ListFailed(_))));
    }

    #[tokio::test]
    async fn test_truncation_caps_output_and_links_next_page() {
        // names of fixed length so every row has the same byte size
        let total = 5000u64;
        let entries: Vec<Entry> = (0..total)
            .map(|i| file(&format!("file-{:06}.txt", i), 1))
            .collect();
        let listing = render(entries, 0).await;

        assert!(listing.truncated);
        let seen = listing.entries_seen;
        assert!(seen < total);

        // notice links to the first unseen entry
        let link = format!("?entry={}", seen + 1);
        assert!(listing.html.contains("Listing truncated"));
        assert!(listing.html.contains(&link));

        // the last counted entry is rendered, the next one is not
        assert!(listing.html.contains(&format!("file-{:06}.txt", seen - 1)));
        assert!(!listing.html.contains(&format!("file-{:06}.txt", seen)));
    }

    #[tokio::test]
    async fn test_truncation_resumes_at_linked_offset() {
        let total = 5000u64;
        let entries = |range: std::ops::Range<u64>| -> Vec<Entry> {
            range.map(|i| file(&format!("file-{:06}.txt", i), 1)).collect()
        };

        let first = render(entries(0..total), 0).await;
        assert!(first.truncated);

        let second = render(entries(0..total), first.entries_seen + 1).await;
        // replay renders exactly the entries the first page did not
        let first_unseen = format!("file-{:06}.txt", first.entries_seen);
        assert!(second.html.contains(&first_unseen));
        assert!(!second.html.contains("file-000000.txt"));
    }
}
