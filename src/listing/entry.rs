use crate::types::ObjectSummary;

// bytes pretty-printing, largest unit first
const UNITS: [(u64, &str); 5] = [
    (1 << 50, " PB"),
    (1 << 40, " TB"),
    (1 << 30, " GB"),
    (1 << 20, " MB"),
    (1 << 10, " KB"),
];

/// One item under the queried prefix: a virtual folder or a concrete object
#[derive(Debug, Clone)]
pub struct Entry {
    pub is_dir: bool,
    /// The store has no symlink concept; kept for renderer icon selection.
    pub is_symlink: bool,
    /// Last segment of `absolute`
    pub name: String,
    /// Full key or prefix string, unique within one listing pass
    pub absolute: String,
    pub size: Option<i64>,
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,
}

impl Entry {
    /// Build a directory entry from a common-prefix string
    pub fn directory(prefix: &str) -> Self {
        let absolute = prefix.trim_start_matches('/').to_string();
        Self {
            is_dir: true,
            is_symlink: false,
            name: final_segment(&absolute),
            absolute,
            size: None,
            last_modified: None,
        }
    }

    /// Build a file entry from an object summary
    pub fn object(summary: ObjectSummary) -> Self {
        Self {
            is_dir: false,
            is_symlink: false,
            name: final_segment(&summary.key),
            absolute: summary.key,
            size: summary.size,
            last_modified: summary.last_modified,
        }
    }

    pub fn is_file(&self) -> bool {
        !self.is_dir
    }
}

/// Last path segment of a key or prefix, ignoring a trailing separator
fn final_segment(path: &str) -> String {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string()
}

/// Human-readable file sizes: floor to the largest unit the count reaches,
/// pluralizing only at the byte tier.
pub fn pretty_size(bytes: u64) -> String {
    for (factor, suffix) in UNITS {
        if bytes >= factor {
            return format!("{}{}", bytes / factor, suffix);
        }
    }
    if bytes == 1 {
        "1 byte".to_string()
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_size_byte_tier() {
        assert_eq!(pretty_size(0), "0 bytes");
        assert_eq!(pretty_size(1), "1 byte");
        assert_eq!(pretty_size(2), "2 bytes");
        assert_eq!(pretty_size(1023), "1023 bytes");
    }

    #[test]
    fn test_pretty_size_unit_boundaries() {
        assert_eq!(pretty_size(1024), "1 KB");
        assert_eq!(pretty_size(1536), "1 KB");
        assert_eq!(pretty_size(2048), "2 KB");
        assert_eq!(pretty_size(1024 * 1024 - 1), "1023 KB");
        assert_eq!(pretty_size(1024 * 1024), "1 MB");
        assert_eq!(pretty_size(1024 * 1024 * 1024), "1 GB");
        assert_eq!(pretty_size(1 << 40), "1 TB");
        assert_eq!(pretty_size(1 << 50), "1 PB");
        assert_eq!(pretty_size((1 << 50) * 3), "3 PB");
    }

    #[test]
    fn test_directory_entry_from_common_prefix() {
        let entry = Entry::directory("srv/enterprise/reposync/");
        assert!(entry.is_dir);
        assert!(!entry.is_symlink);
        assert_eq!(entry.name, "reposync");
        assert_eq!(entry.absolute, "srv/enterprise/reposync/");
        assert!(entry.size.is_none());
        assert!(entry.last_modified.is_none());
    }

    #[test]
    fn test_directory_entry_strips_leading_slash() {
        let entry = Entry::directory("/top/");
        assert_eq!(entry.absolute, "top/");
        assert_eq!(entry.name, "top");
    }

    #[test]
    fn test_object_entry_from_summary() {
        let now = chrono::Utc::now();
        let entry = Entry::object(ObjectSummary {
            key: "srv/enterprise/file.rpm".to_string(),
            size: Some(62780),
            last_modified: Some(now),
        });
        assert!(entry.is_file());
        assert_eq!(entry.name, "file.rpm");
        assert_eq!(entry.absolute, "srv/enterprise/file.rpm");
        assert_eq!(entry.size, Some(62780));
        assert_eq!(entry.last_modified, Some(now));
    }
}
