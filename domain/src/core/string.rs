//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Last `n` items of a slice (the whole slice when shorter).
pub fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// Case-insensitive substring check.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // 'é' is 2 bytes
        assert_eq!(truncate("café au lait", 30), "café au lait");
        // target = 4 lands inside 'é' (bytes 3..5), backs up to 3
        assert_eq!(truncate("café au lait", 7), "caf...");
    }

    #[test]
    fn test_tail() {
        let items = [1, 2, 3, 4, 5];
        assert_eq!(tail(&items, 3), &[3, 4, 5]);
        assert_eq!(tail(&items, 10), &items);
        assert!(tail::<i32>(&[], 3).is_empty());
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Ask ADA next", "ada"));
        assert!(!contains_ignore_case("Ask Bob", "ada"));
    }
}
