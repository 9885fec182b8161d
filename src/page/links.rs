// src/page/links.rs
// =============================================================================
// Rewrites backend-relative hrefs into links that work from a static tree.
//
// The backend serves package docs under /pkg/<id>/ and sources under
// /src/<id>/<file>. The static tree stores them at <id>/index.html and
// src/<id>/<file>.html, and every page links relative to the site root
// through its base path ("../" once per directory level).
//
// Examples with base path "../../":
//   /pkg/foo/bar          -> ../../foo/bar              (folder links)
//   /pkg/foo/bar          -> ../../foo/bar/index.html   (--link-index)
//   /src/foo/bar.go#L10   -> ../../src/foo/bar.go.html#L10
// =============================================================================

/// Relative path from a page under `dir` back to the site root.
///
/// "" -> "", "a" -> "../", "a/b" -> "../../"
pub fn relative_base_path(dir: &str) -> String {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        return String::new();
    }
    "../".repeat(dir.matches('/').count() + 1)
}

/// Rewrites an href pointing into the backend (/src/ or /pkg/).
///
/// Returns None for every other href, which is left untouched.
pub fn rewrite_backend_href(href: &str, base_path: &str, link_index: bool) -> Option<String> {
    if !href.starts_with("/src/") && !href.starts_with("/pkg/") {
        return None;
    }

    let (path, suffix) = split_suffix(href);
    let mut path = path.to_string();

    if is_file_path(&path) {
        path.push_str(".html");
    } else if link_index {
        if !path.ends_with('/') {
            path.push('/');
        }
        path.push_str("index.html");
    }

    // Package pages live at the site root, not under pkg/
    if path.starts_with("/pkg/") {
        path.replace_range(..4, "");
    }

    Some(format!("{}{}{}", base_path, &path[1..], suffix))
}

/// Appends ".html" to file links inside a source directory listing.
///
/// Parent ("..") and sub-directory ("name/") links, links that already end
/// in .html, fragment-only links, and links to other sites are left alone.
pub fn normalize_listing_href(href: &str) -> Option<String> {
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("javascript:")
        || href.contains("://")
    {
        return None;
    }

    let (path, suffix) = split_suffix(href);
    if path.is_empty() || path.ends_with('.') || path.ends_with('/') || path.ends_with(".html") {
        return None;
    }

    Some(format!("{}.html{}", path, suffix))
}

// Splits "path?query#fragment" into ("path", "?query#fragment")
fn split_suffix(href: &str) -> (&str, &str) {
    let cut = href.find(['?', '#']).unwrap_or(href.len());
    href.split_at(cut)
}

// A path names a file when its last segment contains a dot
// ("bar.go", "doc.html"); a trailing slash always means a directory.
fn is_file_path(path: &str) -> bool {
    !path.ends_with('/')
        && path
            .rsplit('/')
            .next()
            .is_some_and(|segment| segment.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_base_path() {
        assert_eq!(relative_base_path(""), "");
        assert_eq!(relative_base_path("fmt"), "../");
        assert_eq!(relative_base_path("github.com/user/repo"), "../../../");
        assert_eq!(relative_base_path("src/a/b"), "../../../");
    }

    #[test]
    fn test_package_link_folder_mode() {
        assert_eq!(
            rewrite_backend_href("/pkg/foo/bar", "../", false).as_deref(),
            Some("../foo/bar")
        );
        assert_eq!(
            rewrite_backend_href("/pkg/foo/bar/", "../", false).as_deref(),
            Some("../foo/bar/")
        );
    }

    #[test]
    fn test_package_link_index_mode() {
        assert_eq!(
            rewrite_backend_href("/pkg/foo/bar", "../", true).as_deref(),
            Some("../foo/bar/index.html")
        );
        assert_eq!(
            rewrite_backend_href("/pkg/foo/?m=all", "", true).as_deref(),
            Some("foo/index.html?m=all")
        );
        assert_eq!(
            rewrite_backend_href("/pkg/", "../../", true).as_deref(),
            Some("../../index.html")
        );
    }

    #[test]
    fn test_source_links() {
        assert_eq!(
            rewrite_backend_href("/src/foo/bar.go", "../", false).as_deref(),
            Some("../src/foo/bar.go.html")
        );
        assert_eq!(
            rewrite_backend_href("/src/foo/bar.go#L10", "../", true).as_deref(),
            Some("../src/foo/bar.go.html#L10")
        );
        assert_eq!(
            rewrite_backend_href("/src/foo/bar.go?s=120:180#L12", "", false).as_deref(),
            Some("src/foo/bar.go.html?s=120:180#L12")
        );
    }

    #[test]
    fn test_dotted_directory_is_not_a_file() {
        assert_eq!(
            rewrite_backend_href("/pkg/github.com/", "", false).as_deref(),
            Some("github.com/")
        );
    }

    #[test]
    fn test_other_links_untouched() {
        assert_eq!(rewrite_backend_href("https://golang.org/", "../", false), None);
        assert_eq!(rewrite_backend_href("#pkg-index", "../", false), None);
        assert_eq!(rewrite_backend_href("/doc/", "../", false), None);
    }

    #[test]
    fn test_normalize_listing_href() {
        assert_eq!(normalize_listing_href("bar.go").as_deref(), Some("bar.go.html"));
        assert_eq!(normalize_listing_href("README").as_deref(), Some("README.html"));
        assert_eq!(normalize_listing_href(".."), None);
        assert_eq!(normalize_listing_href("sub/"), None);
        assert_eq!(normalize_listing_href("../../src/x/a.go.html"), None);
        assert_eq!(normalize_listing_href("../../src/x/a.go.html#L3"), None);
        assert_eq!(normalize_listing_href("#L3"), None);
        assert_eq!(normalize_listing_href("https://golang.org"), None);
    }
}
