//! Candidate-path computation for longest-prefix matching.

use percent_encoding::percent_decode_str;

/// Every prefix of `path` that ends in `/`, shortest first, always starting
/// with the root `/`.
///
/// `/photos/album/2008/09` becomes `/`, `/photos/`, `/photos/album/`,
/// `/photos/album/2008/`.
pub fn candidate_paths(path: &str) -> Vec<String> {
    let mut paths = vec!["/".to_string()];
    for (idx, _) in path.match_indices('/') {
        let prefix = &path[..=idx];
        if prefix != "/" {
            paths.push(prefix.to_string());
        }
    }
    paths
}

/// Proper prefixes of a Route url, i.e. where its ancestors could live.
pub fn ancestor_paths(url: &str) -> Vec<String> {
    let mut paths = candidate_paths(url);
    paths.retain(|p| p != url);
    paths
}

/// Depth of a url: root is 0, `/a/` is 1.
pub fn level(url: &str) -> usize {
    url.matches('/').count().saturating_sub(1)
}

/// Decode a raw request path into the form urls are stored in: no percent
/// escapes, starting with `/`.
///
/// Returns `None` when the decoded bytes are not UTF-8.
pub fn canonical_path(raw: &str) -> Option<String> {
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;
    Some(if decoded.starts_with('/') {
        decoded.into_owned()
    } else {
        format!("/{decoded}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_full_path() {
        assert_eq!(
            candidate_paths("/a/b/c/"),
            vec!["/", "/a/", "/a/b/", "/a/b/c/"]
        );
    }

    #[test]
    fn test_split_without_trailing_slash() {
        assert_eq!(
            candidate_paths("/photos/album/2008/09"),
            vec!["/", "/photos/", "/photos/album/", "/photos/album/2008/"]
        );
    }

    #[test]
    fn test_split_root_and_empty() {
        assert_eq!(candidate_paths("/"), vec!["/"]);
        assert_eq!(candidate_paths(""), vec!["/"]);
    }

    #[test]
    fn test_ancestor_paths() {
        assert_eq!(ancestor_paths("/"), Vec::<String>::new());
        assert_eq!(ancestor_paths("/branch/leaf/"), vec!["/", "/branch/"]);
    }

    #[test]
    fn test_level() {
        assert_eq!(level("/"), 0);
        assert_eq!(level("/branch/"), 1);
        assert_eq!(level("/branch/leaf/"), 2);
    }

    #[test]
    fn test_canonical_path() {
        assert_eq!(canonical_path("blog/").as_deref(), Some("/blog/"));
        assert_eq!(canonical_path("/blog/").as_deref(), Some("/blog/"));
        assert_eq!(canonical_path("").as_deref(), Some("/"));
    }

    #[test]
    fn test_canonical_path_decodes() {
        assert_eq!(canonical_path("/caf%C3%A9/").as_deref(), Some("/café/"));
        assert_eq!(canonical_path("/a%20b/").as_deref(), Some("/a b/"));
        assert_eq!(canonical_path("/caf%E9/"), None);
    }
}
