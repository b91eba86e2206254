//! Content rules for post and comment text.

use crate::error::ContentError;

/// Maximum length of a post or comment, in characters.
pub const MAX_TEXT_CHARS: usize = 2048;

/// Maximum length of a single whitespace-delimited word, in characters.
pub const MAX_WORD_CHARS: usize = 64;

/// Check `text` against the length rules.
///
/// Lengths are counted in Unicode scalar values, not bytes.
pub fn validate_content(text: &str) -> Result<(), ContentError> {
    let length = text.chars().count();
    if length > MAX_TEXT_CHARS {
        return Err(ContentError::TooLong {
            length,
            max: MAX_TEXT_CHARS,
        });
    }

    if let Some(length) = text
        .split_whitespace()
        .map(|word| word.chars().count())
        .find(|&len| len > MAX_WORD_CHARS)
    {
        return Err(ContentError::WordTooLong {
            length,
            max: MAX_WORD_CHARS,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_ordinary_text() {
        assert!(validate_content("A perfectly ordinary post about Rust.").is_ok());
        assert!(validate_content("").is_ok());
    }

    #[test]
    fn test_boundary_lengths_pass() {
        let words = vec!["a".repeat(MAX_WORD_CHARS); 31].join(" ");
        assert!(words.chars().count() <= MAX_TEXT_CHARS);
        assert!(validate_content(&words).is_ok());

        let mut exact = vec!["b".repeat(63); 31].join(" ");
        exact.push(' ');
        exact.push_str(&"c".repeat(MAX_WORD_CHARS));
        assert_eq!(exact.chars().count(), MAX_TEXT_CHARS);
        assert!(validate_content(&exact).is_ok());
    }

    #[test]
    fn test_rejects_text_over_limit() {
        let text = "a ".repeat(1024) + "a";
        assert_eq!(
            validate_content(&text),
            Err(ContentError::TooLong {
                length: 2049,
                max: MAX_TEXT_CHARS
            })
        );
    }

    #[test]
    fn test_single_long_token_reports_too_long_first() {
        let text = "a".repeat(2049);
        assert!(matches!(
            validate_content(&text),
            Err(ContentError::TooLong { length: 2049, .. })
        ));
    }

    #[test]
    fn test_rejects_long_word_in_short_text() {
        let text = format!("short words then {} and more", "x".repeat(65));
        assert_eq!(
            validate_content(&text),
            Err(ContentError::WordTooLong {
                length: 65,
                max: MAX_WORD_CHARS
            })
        );
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 64 Cyrillic letters are 128 bytes but a valid word.
        let word = "ж".repeat(MAX_WORD_CHARS);
        assert!(validate_content(&word).is_ok());

        let word = "ж".repeat(MAX_WORD_CHARS + 1);
        assert!(matches!(
            validate_content(&word),
            Err(ContentError::WordTooLong { length: 65, .. })
        ));
    }

    #[test]
    fn test_any_whitespace_splits_words() {
        let text = format!("{}\n{}\t{}", "a".repeat(64), "b".repeat(64), "c".repeat(64));
        assert!(validate_content(&text).is_ok());
    }
}
