//! Function-word stoplist for content-token comparison.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Punjabi/Sant Bhasha function words stripped before semantic scoring.
/// Distinctive-token checks must not be satisfied by these.
pub static FUNCTION_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        // Modern Punjabi particles
        "ਹੈ", "ਹਨ", "ਸੀ", "ਨੇ", "ਨੂੰ", "ਤੇ", "ਦਾ", "ਦੀ", "ਦੇ", "ਵਿਚ", "ਵਿੱਚ", "ਇਹ", "ਉਹ",
        "ਜੀ", "ਕਿ", "ਨਾ", "ਹੀ", "ਵੀ", "ਤਾਂ", "ਜੋ", "ਅਤੇ", "ਜਾਂ", "ਇਕ", "ਇੱਕ", "ਨਹੀਂ",
        // Sant Bhasha particles common in Gurbani
        "ਕਾ", "ਕੀ", "ਕੇ", "ਕੋ", "ਮੈ", "ਮੇਰਾ", "ਤੇਰਾ", "ਸੋ", "ਜਿਉ", "ਜਬ", "ਤਬ",
    ])
});

/// Tokens of `text` with function words removed.
pub fn content_tokens(tokens: &[String]) -> Vec<&str> {
    tokens
        .iter()
        .map(|t| t.as_str())
        .filter(|t| !FUNCTION_WORDS.contains(t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_words_filtered() {
        let tokens: Vec<String> = ["ਸਤਿ", "ਨਾਮੁ", "ਹੈ", "ਜੀ"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let content = content_tokens(&tokens);
        assert_eq!(content, vec!["ਸਤਿ", "ਨਾਮੁ"]);
    }
}
