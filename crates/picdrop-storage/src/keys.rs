//! Shared key generation for store backends.
//!
//! Key format: `{unix_millis}-{sequence}-{sanitized_filename}`.

use std::sync::atomic::{AtomicU64, Ordering};

static KEY_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate a storage key for an uploaded file.
///
/// Combines the current unix-millisecond timestamp with a per-process
/// monotonic sequence number and the sanitized original filename. The
/// sequence keeps keys unique when a concurrent batch produces several
/// keys within the same millisecond. All backends must use this format.
pub fn generate_storage_key(filename: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let seq = KEY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}", millis, seq, sanitize_filename(filename))
}

/// Reduce a client-supplied filename to a safe single path segment.
///
/// Drops any directory components, replaces characters outside
/// `[A-Za-z0-9._-]`, and collapses `..` runs so keys can never traverse
/// out of a backend's storage root.
fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let mut name: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    while name.contains("..") {
        name = name.replace("..", ".");
    }

    let name = name.trim_start_matches('.').to_string();
    if name.is_empty() {
        "file".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique_for_same_filename() {
        let a = generate_storage_key("cat.jpg");
        let b = generate_storage_key("cat.jpg");
        assert_ne!(a, b);
        assert!(a.ends_with("cat.jpg"));
        assert!(b.ends_with("cat.jpg"));
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_filename("/etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "boot.ini");
    }

    #[test]
    fn test_sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_filename("a b"), "a_b");
    }

    #[test]
    fn test_sanitize_collapses_dot_runs() {
        let name = sanitize_filename("evil....png");
        assert!(!name.contains(".."));
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename("..."), "file");
    }

    #[test]
    fn test_generated_key_has_no_traversal() {
        let key = generate_storage_key("../../secret");
        assert!(!key.contains(".."));
        assert!(!key.starts_with('/'));
    }
}
