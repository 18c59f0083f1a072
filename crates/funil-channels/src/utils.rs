//! Shared utilities for channel implementations.

/// Largest char boundary in `text` that is `<= index`.
fn floor_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Split a long message into chunks that respect a platform's character limit.
///
/// All slice boundaries are aligned to UTF-8 char boundaries so accented
/// Portuguese text and emoji never panic. Prefers splitting at newline
/// boundaries when possible.
pub fn split_message(text: &str, max_len: usize) -> Vec<&str> {
    if text.len() <= max_len {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = floor_boundary(text, start + max_len);
        if end == start {
            // max_len is smaller than one char: take the whole char.
            end = text[start..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| start + i)
                .unwrap_or(text.len());
        }
        let break_at = if end < text.len() {
            text[start..end]
                .rfind('\n')
                .map(|i| start + i + 1)
                .filter(|&b| b > start)
                .unwrap_or(end)
        } else {
            end
        };
        chunks.push(&text[start..break_at]);
        start = break_at;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_short_message() {
        assert_eq!(split_message("olá", 4096), vec!["olá"]);
    }

    #[test]
    fn test_split_long_message_prefers_newlines() {
        let text = "linha\n".repeat(1000);
        let chunks = split_message(&text, 4096);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.len() <= 4096);
            assert!(chunk.ends_with('\n'));
        }
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_multibyte_never_panics() {
        let text = "ção🙂".repeat(500);
        let chunks = split_message(&text, 7);
        assert_eq!(chunks.concat(), text);
        for chunk in &chunks {
            assert!(chunk.len() <= 7);
        }
    }

    #[test]
    fn test_split_tiny_limit_takes_whole_char() {
        let chunks = split_message("🙂🙂", 2);
        assert_eq!(chunks, vec!["🙂", "🙂"]);
    }
}
