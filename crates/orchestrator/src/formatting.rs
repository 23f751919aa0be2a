//! Splitting replies into chat-sized chunks.

/// Longest chunk sent as one chat line.
pub const MAX_CHUNK_CHARS: usize = 399;

/// Split `text` into lines of at most [`MAX_CHUNK_CHARS`] characters.
///
/// Line breaks always start a new chunk and blank lines are dropped, since
/// chat cannot carry either.
pub fn split_message(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();

    for line in text.split(|c: char| matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')) {
        let chars: Vec<char> = line.chars().collect();
        for piece in chars.chunks(MAX_CHUNK_CHARS) {
            let chunk: String = piece.iter().collect();
            if !chunk.trim().is_empty() {
                chunks.push(chunk);
            }
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_is_one_chunk() {
        assert_eq!(split_message("hello chat"), vec!["hello chat"]);
    }

    #[test]
    fn test_long_message_splits_at_limit() {
        let text = "a".repeat(1000);
        let chunks = split_message(&text);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 399);
        assert_eq!(chunks[1].chars().count(), 399);
        assert_eq!(chunks[2].chars().count(), 202);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_exact_limit() {
        assert_eq!(split_message(&"b".repeat(399)).len(), 1);
        assert_eq!(split_message(&"b".repeat(400)).len(), 2);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = "é".repeat(500);
        let chunks = split_message(&text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 399);
    }

    #[test]
    fn test_newlines_start_new_chunks() {
        let chunks = split_message("first line\n\nsecond line\r\nthird");
        assert_eq!(chunks, vec!["first line", "second line", "third"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_message("").is_empty());
        assert!(split_message("  \n ").is_empty());
    }
}
