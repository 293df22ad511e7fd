//! Key normalization helpers.
//!
//! Keys are slash-delimited paths such as `com/acme/app/param`. Backends that
//! address resources by path accept backslashes and a leading slash, and may
//! carry a scheme prefix (`file:`, `classpath:`).

/// Replaces backslashes with forward slashes.
pub fn normalize_key(key: &str) -> String {
    key.replace('\\', "/")
}

/// Normalizes a key and strips a single leading slash.
pub fn normalize_relative(key: &str) -> String {
    let normalized = normalize_key(key);
    match normalized.strip_prefix('/') {
        Some(rest) => rest.to_string(),
        None => normalized,
    }
}

/// Strips `prefix` from `key` if present, returning the remainder.
pub fn strip_scheme<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    key.strip_prefix(prefix)
}

/// Returns the parent part of a key (everything before the last `/`).
pub fn parent_path(key: &str) -> Option<&str> {
    key.rfind('/').map(|idx| &key[..idx])
}

/// Returns the last segment of a key.
pub fn leaf_name(key: &str) -> &str {
    match key.rfind('/') {
        Some(idx) => &key[idx + 1..],
        None => key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key_replaces_backslashes() {
        assert_eq!(normalize_key(r"com\acme\param"), "com/acme/param");
    }

    #[test]
    fn test_normalize_relative_strips_leading_slash() {
        assert_eq!(normalize_relative("/com/acme"), "com/acme");
        assert_eq!(normalize_relative(r"\com\acme"), "com/acme");
        assert_eq!(normalize_relative("com/acme"), "com/acme");
    }

    #[test]
    fn test_parent_and_leaf() {
        assert_eq!(parent_path("a/b/c"), Some("a/b"));
        assert_eq!(parent_path("c"), None);
        assert_eq!(leaf_name("a/b/c"), "c");
        assert_eq!(leaf_name("c"), "c");
    }

    #[test]
    fn test_strip_scheme() {
        assert_eq!(strip_scheme("file:a/b", "file:"), Some("a/b"));
        assert_eq!(strip_scheme("a/b", "file:"), None);
    }
}
