//! File-name derivation from task URLs
//!
//! Staged downloads and zip entries are named `{index}_{basename}` so
//! that files with identical basenames inside one task never collide.
//! The basename is the last path segment of the URL, query and fragment
//! stripped.

/// Returns the base filename of a URL (the part after the last `/`),
/// with any query string or fragment removed.
///
/// Falls back to the whole (trimmed) URL when there is no `/`.
pub fn base_name(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let trimmed = &url[..end];
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Returns the file extension of a URL including the leading dot
/// (e.g. `.pdf`), or `None` when the basename has no dot.
///
/// Comparison against the configured allow-list is case-sensitive, so
/// no normalization happens here.
pub fn extension(url: &str) -> Option<&str> {
    let base = base_name(url);
    base.rfind('.').map(|idx| &base[idx..])
}

/// Returns the staged name for the `index`-th file of a task,
/// `{index}_{basename}`. This name is used both on disk in the staging
/// directory and as the entry name inside the final archive.
pub fn staged_name(index: usize, url: &str) -> String {
    format!("{}_{}", index, base_name(url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_takes_last_segment() {
        assert_eq!(base_name("https://example.com/docs/report.pdf"), "report.pdf");
        assert_eq!(base_name("https://example.com/a.jpg"), "a.jpg");
    }

    #[test]
    fn base_name_strips_query_and_fragment() {
        assert_eq!(base_name("https://example.com/a.jpg?w=640"), "a.jpg");
        assert_eq!(base_name("https://example.com/a.jpg#top"), "a.jpg");
        assert_eq!(base_name("https://example.com/a.jpg?w=640#top"), "a.jpg");
    }

    #[test]
    fn base_name_without_slashes() {
        assert_eq!(base_name("report.pdf"), "report.pdf");
    }

    #[test]
    fn extension_includes_dot() {
        assert_eq!(extension("https://example.com/report.pdf"), Some(".pdf"));
        assert_eq!(extension("https://example.com/archive.tar.gz"), Some(".gz"));
    }

    #[test]
    fn extension_is_case_sensitive() {
        assert_eq!(extension("https://example.com/photo.JPG"), Some(".JPG"));
    }

    #[test]
    fn extension_missing() {
        assert_eq!(extension("https://example.com/download"), None);
        assert_eq!(extension("https://example.com/dir/"), None);
    }

    #[test]
    fn staged_name_prefixes_index() {
        assert_eq!(staged_name(0, "https://example.com/a.pdf"), "0_a.pdf");
        assert_eq!(staged_name(2, "https://example.com/x/y/c.jpeg"), "2_c.jpeg");
    }
}
