//! Query and corpus text normalization.
//!
//! Every comparison inside the index runs on normalized text: Unicode NFC,
//! collapsed whitespace, decorative punctuation removed. Gurbani corpora
//! carry vishraam marks and section ornaments (danda, double danda, Ek
//! Onkar framing) that must not count against similarity.

use unicode_normalization::UnicodeNormalization;

/// Characters that decorate Gurbani text without carrying content.
fn is_decorative(c: char) -> bool {
    matches!(
        c,
        '।' | '॥' | '☬' | '꠳' | '꠴' | '꠵' | ';' | ',' | '.' | '!' | '?' | ':' | '"' | '\''
            | '(' | ')' | '[' | ']' | '{' | '}' | '-' | '_' | '|'
    )
}

/// Normalize a Gurmukhi query or corpus line for lookup.
///
/// NFC first, then decorative punctuation drops out and whitespace runs
/// collapse to single spaces.
pub fn normalize_gurmukhi_query(text: &str) -> String {
    let nfc: String = text.nfc().collect();
    let cleaned: String = nfc
        .chars()
        .map(|c| if is_decorative(c) { ' ' } else { c })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split normalized text into word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize_gurmukhi_query(text)
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}

/// Character trigrams of normalized text, used by the inverted index.
/// Spaces are kept so word boundaries contribute to the signature.
pub fn trigrams(normalized: &str) -> Vec<String> {
    let chars: Vec<char> = normalized.chars().collect();
    if chars.len() < 3 {
        if chars.is_empty() {
            return Vec::new();
        }
        return vec![chars.iter().collect()];
    }
    chars.windows(3).map(|w| w.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_danda_and_collapses_whitespace() {
        let normalized = normalize_gurmukhi_query("ਸਤਿ ਨਾਮੁ ॥   ਕਰਤਾ  ਪੁਰਖੁ ।");
        assert_eq!(normalized, "ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖੁ");
    }

    #[test]
    fn test_normalization_idempotent() {
        let once = normalize_gurmukhi_query("ਸਤਿ  ਨਾਮੁ ॥");
        let twice = normalize_gurmukhi_query(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("ਸਤਿ ਨਾਮੁ ॥"),
            vec!["ਸਤਿ".to_string(), "ਨਾਮੁ".to_string()]
        );
        assert!(tokenize("  ").is_empty());
    }

    #[test]
    fn test_trigrams_short_input() {
        assert!(trigrams("").is_empty());
        assert_eq!(trigrams("ਸਤ"), vec!["ਸਤ".to_string()]);
        assert_eq!(trigrams("abcd").len(), 2);
    }
}
