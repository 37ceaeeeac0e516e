// src/utils/text.rs

//! UTF-8 byte-level text helpers.

use std::ops::Range;

/// Longest prefix of `text` that fits in `max_bytes` without splitting a code point.
///
/// Cuts the byte buffer at `max_bytes`, then drops trailing bytes one at a
/// time until the remainder decodes.
pub fn truncate_to_byte_budget(text: &str, max_bytes: usize) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() <= max_bytes {
        return text;
    }

    let mut end = max_bytes;
    loop {
        match std::str::from_utf8(&bytes[..end]) {
            Ok(prefix) => return prefix,
            // `end == 0` always decodes, so this terminates.
            Err(_) => end -= 1,
        }
    }
}

/// Byte range of the first occurrence of `needle` in `haystack` at or after `from`.
pub fn find_byte_range(haystack: &str, needle: &str, from: usize) -> Option<Range<usize>> {
    if needle.is_empty() {
        return None;
    }
    let start = from + haystack.get(from..)?.find(needle)?;
    Some(start..start + needle.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_to_byte_budget("abc", 3), "abc");
        assert_eq!(truncate_to_byte_budget("abc", 10), "abc");
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate_to_byte_budget("abcdef", 4), "abcd");
        assert_eq!(truncate_to_byte_budget("abcdef", 0), "");
    }

    #[test]
    fn test_truncate_never_splits_code_point() {
        // "é" is 2 bytes, "한" is 3 bytes, "🦀" is 4 bytes
        let text = "aé한🦀";
        assert_eq!(truncate_to_byte_budget(text, 2), "a");
        assert_eq!(truncate_to_byte_budget(text, 3), "aé");
        assert_eq!(truncate_to_byte_budget(text, 5), "aé");
        assert_eq!(truncate_to_byte_budget(text, 6), "aé한");
        assert_eq!(truncate_to_byte_budget(text, 9), "aé한");
        assert_eq!(truncate_to_byte_budget(text, 10), "aé한🦀");
    }

    #[test]
    fn test_truncate_every_budget_decodes() {
        let text = "https://example.com/ünïcödé/路径/🦀🦀";
        for budget in 0..=text.len() {
            let cut = truncate_to_byte_budget(text, budget);
            assert!(cut.len() <= budget);
            assert!(text.starts_with(cut));
            assert!(std::str::from_utf8(cut.as_bytes()).is_ok());
        }
    }

    #[test]
    fn test_find_byte_range_uses_byte_offsets() {
        let text = "한국 #tag";
        assert_eq!(find_byte_range(text, "#tag", 0), Some(7..11));
        assert_eq!(&text[7..11], "#tag");
    }

    #[test]
    fn test_find_byte_range_respects_start() {
        let text = "x.com and x.com";
        assert_eq!(find_byte_range(text, "x.com", 0), Some(0..5));
        assert_eq!(find_byte_range(text, "x.com", 5), Some(10..15));
        assert_eq!(find_byte_range(text, "x.com", 11), None);
    }

    #[test]
    fn test_find_byte_range_rejects_bad_input() {
        assert_eq!(find_byte_range("abc", "", 0), None);
        assert_eq!(find_byte_range("é", "x", 1), None);
        assert_eq!(find_byte_range("abc", "a", 10), None);
    }
}
