//! Gurmukhi → Roman transliteration.
//!
//! Three schemes share one syllable parser and differ only in their
//! letter tables and schwa policy:
//! - `iso15919`: academic, long ē/ō, nasal ṁ, inherent vowel always written
//! - `iast`: Sanskrit-based, e/o without macrons, nasal ṃ
//! - `practical`: reader-friendly digraphs (ch, sh), word-final inherent
//!   vowel dropped, nasal written as n (absorbed before nasal consonants)

use katha_config::RomanScheme;

use crate::chars::{
    is_consonant, is_independent_vowel, is_nasal_consonant, is_nasal_mark, is_vowel_sign, ADHAK,
    NUKTA, VIRAMA,
};

/// Gurmukhi → Roman transliterator for a fixed scheme.
#[derive(Debug, Clone)]
pub struct Romanizer {
    scheme: RomanScheme,
    capitalize: bool,
}

impl Romanizer {
    pub fn new(scheme: RomanScheme, capitalize: bool) -> Self {
        Self { scheme, capitalize }
    }

    pub fn scheme(&self) -> RomanScheme {
        self.scheme
    }

    /// Transliterate Gurmukhi text. Non-Gurmukhi content passes through.
    pub fn transliterate(&self, gurmukhi: &str) -> String {
        if gurmukhi.trim().is_empty() {
            return String::new();
        }

        let words: Vec<String> = gurmukhi
            .split(' ')
            .map(|word| self.transliterate_word(word))
            .collect();
        let mut result = words.join(" ");

        if self.capitalize && self.scheme == RomanScheme::Practical {
            result = capitalize_words(&result);
        }

        result
    }

    fn transliterate_word(&self, word: &str) -> String {
        let chars: Vec<char> = word.chars().collect();
        let n = chars.len();
        let mut out = String::new();
        let mut double_next = false;

        let mut i = 0;
        while i < n {
            let c = chars[i];

            if is_independent_vowel(c) {
                out.push_str(vowel_roman(c, self.scheme));
                i += 1;
                if i < n && is_nasal_mark(chars[i]) {
                    out.push_str(&self.nasal_roman(chars.get(i + 1).copied(), i + 1 >= n));
                    i += 1;
                }
                continue;
            }

            if is_consonant(c) {
                i += 1;
                let mut base_char = c;
                if i < n && chars[i] == NUKTA {
                    base_char = apply_nukta(c);
                    i += 1;
                }

                let base = consonant_roman(base_char, self.scheme);
                if double_next {
                    // Gemination doubles the first letter of the base.
                    if let Some(first) = base.chars().next() {
                        out.push(first);
                    }
                    double_next = false;
                }
                out.push_str(base);

                if i < n && chars[i] == VIRAMA {
                    // Subjoined form: no inherent vowel.
                    i += 1;
                    continue;
                }

                let mut vowel: Option<&'static str> = None;
                if i < n && is_vowel_sign(chars[i]) {
                    vowel = Some(vowel_sign_roman(chars[i], self.scheme));
                    i += 1;
                }

                let mut nasal = false;
                if i < n && is_nasal_mark(chars[i]) {
                    nasal = true;
                    i += 1;
                }

                if i < n && chars[i] == ADHAK {
                    double_next = true;
                    i += 1;
                }

                match vowel {
                    Some(v) => out.push_str(v),
                    None => {
                        let word_final = i >= n;
                        let write_inherent = match self.scheme {
                            RomanScheme::Practical => !word_final,
                            RomanScheme::Iso15919 | RomanScheme::Iast => true,
                        };
                        if write_inherent {
                            out.push('a');
                        }
                    }
                }

                if nasal {
                    out.push_str(&self.nasal_roman(chars.get(i).copied(), i >= n));
                }
                continue;
            }

            if c == ADHAK {
                double_next = true;
                i += 1;
                continue;
            }

            if is_nasal_mark(c) {
                out.push_str(&self.nasal_roman(chars.get(i + 1).copied(), i + 1 >= n));
                i += 1;
                continue;
            }

            if c == VIRAMA || c == NUKTA {
                // Stray combining mark with no base; nothing to render.
                i += 1;
                continue;
            }

            if let Some(digit) = gurmukhi_digit(c) {
                out.push(digit);
                i += 1;
                continue;
            }

            // Whitespace, punctuation, and unknown codepoints pass through.
            out.push(c);
            i += 1;
        }

        out
    }

    fn nasal_roman(&self, following: Option<char>, word_final: bool) -> String {
        match self.scheme {
            RomanScheme::Iso15919 => "ṁ".to_string(),
            RomanScheme::Iast => "ṃ".to_string(),
            RomanScheme::Practical => {
                if !word_final && following.is_some_and(is_nasal_consonant) {
                    // The following nasal consonant supplies the sound.
                    String::new()
                } else {
                    "n".to_string()
                }
            }
        }
    }
}

/// Fold a combining nukta onto its base consonant, yielding the
/// precomposed codepoint (NFC leaves these pairs decomposed, so the
/// parser folds them itself).
fn apply_nukta(c: char) -> char {
    match c {
        'ਖ' => '\u{0A59}', // ਖ਼
        'ਗ' => '\u{0A5A}', // ਗ਼
        'ਜ' => '\u{0A5B}', // ਜ਼
        'ਫ' => '\u{0A5E}', // ਫ਼
        'ਸ' => '\u{0A36}', // ਸ਼
        'ਲ' => '\u{0A33}', // ਲ਼
        'ਡ' => '\u{0A5C}', // ੜ
        other => other,
    }
}

fn consonant_roman(c: char, scheme: RomanScheme) -> &'static str {
    use RomanScheme::*;
    match (c, scheme) {
        ('ਕ', _) => "k",
        ('ਖ', _) => "kh",
        ('ਗ', _) => "g",
        ('ਘ', _) => "gh",
        ('ਙ', Practical) => "ng",
        ('ਙ', _) => "ṅ",
        ('ਚ', Practical) => "ch",
        ('ਚ', _) => "c",
        ('ਛ', Practical) => "chh",
        ('ਛ', _) => "ch",
        ('ਜ', _) => "j",
        ('ਝ', _) => "jh",
        ('ਞ', Practical) => "n",
        ('ਞ', _) => "ñ",
        ('ਟ', Practical) => "t",
        ('ਟ', _) => "ṭ",
        ('ਠ', Practical) => "th",
        ('ਠ', _) => "ṭh",
        ('ਡ', Practical) => "d",
        ('ਡ', _) => "ḍ",
        ('ਢ', Practical) => "dh",
        ('ਢ', _) => "ḍh",
        ('ਣ', Practical) => "n",
        ('ਣ', _) => "ṇ",
        ('ਤ', _) => "t",
        ('ਥ', _) => "th",
        ('ਦ', _) => "d",
        ('ਧ', _) => "dh",
        ('ਨ', _) => "n",
        ('ਪ', _) => "p",
        ('ਫ', _) => "ph",
        ('ਬ', _) => "b",
        ('ਭ', _) => "bh",
        ('ਮ', _) => "m",
        ('ਯ', _) => "y",
        ('ਰ', _) => "r",
        ('ਲ', _) => "l",
        ('ਵ', _) => "v",
        ('ਸ', _) => "s",
        ('ਹ', _) => "h",
        ('ੜ', Practical) => "r",
        ('ੜ', _) => "ṛ",
        ('\u{0A36}', Practical) => "sh", // ਸ਼
        ('\u{0A36}', _) => "ś",
        ('\u{0A59}', Practical) => "kh", // ਖ਼
        ('\u{0A59}', _) => "ḵh",
        ('\u{0A5A}', Practical) => "g", // ਗ਼
        ('\u{0A5A}', _) => "ġ",
        ('\u{0A5B}', _) => "z",  // ਜ਼
        ('\u{0A5E}', _) => "f",  // ਫ਼
        ('\u{0A33}', Practical) => "l", // ਲ਼
        ('\u{0A33}', _) => "ḷ",
        _ => "",
    }
}

fn vowel_roman(c: char, scheme: RomanScheme) -> &'static str {
    use RomanScheme::*;
    match (c, scheme) {
        ('ਅ', _) => "a",
        ('ਆ', _) => "ā",
        ('ਇ', _) => "i",
        ('ਈ', _) => "ī",
        ('ਉ', _) => "u",
        ('ਊ', _) => "ū",
        ('ਏ', Iso15919) => "ē",
        ('ਏ', _) => "e",
        ('ਐ', _) => "ai",
        ('ਓ', Iso15919) => "ō",
        ('ਓ', _) => "o",
        ('ਔ', _) => "au",
        _ => "",
    }
}

fn vowel_sign_roman(c: char, scheme: RomanScheme) -> &'static str {
    use RomanScheme::*;
    match (c, scheme) {
        ('\u{0A3E}', _) => "ā",
        ('\u{0A3F}', _) => "i",
        ('\u{0A40}', _) => "ī",
        ('\u{0A41}', _) => "u",
        ('\u{0A42}', _) => "ū",
        ('\u{0A47}', Iso15919) => "ē",
        ('\u{0A47}', _) => "e",
        ('\u{0A48}', _) => "ai",
        ('\u{0A4B}', Iso15919) => "ō",
        ('\u{0A4B}', _) => "o",
        ('\u{0A4C}', _) => "au",
        _ => "",
    }
}

fn gurmukhi_digit(c: char) -> Option<char> {
    match c {
        '੦'..='੯' => char::from_u32('0' as u32 + (c as u32 - '੦' as u32)),
        _ => None,
    }
}

fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) if first.is_alphabetic() => {
                    first.to_uppercase().collect::<String>() + chars.as_str()
                }
                Some(first) => first.to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Consonant skeleton of Gurmukhi text: the base consonants in order,
/// with nukta folded in. The ISO 15919 round-trip preserves this for
/// alphabet-only input.
pub fn gurmukhi_consonant_skeleton(text: &str) -> Vec<char> {
    let chars: Vec<char> = text.chars().collect();
    let mut skeleton = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if is_consonant(c) {
            if chars.get(i + 1) == Some(&NUKTA) {
                skeleton.push(apply_nukta(c));
                i += 2;
                continue;
            }
            skeleton.push(c);
        }
        i += 1;
    }
    skeleton
}

/// Best-effort inverse for the ISO 15919 scheme: recover the consonant
/// skeleton from romanized text. Only defined for the canonical
/// alphabet-only subset; digraphs are matched longest-first.
pub fn roman_consonant_skeleton(roman: &str) -> Vec<char> {
    const DIGRAPHS: &[(&str, char)] = &[
        ("ḵh", '\u{0A59}'), // ਖ਼
        ("kh", 'ਖ'),
        ("gh", 'ਘ'),
        ("ch", 'ਛ'),
        ("jh", 'ਝ'),
        ("ṭh", 'ਠ'),
        ("ḍh", 'ਢ'),
        ("th", 'ਥ'),
        ("dh", 'ਧ'),
        ("ph", 'ਫ'),
        ("bh", 'ਭ'),
    ];
    const SINGLES: &[(char, char)] = &[
        ('k', 'ਕ'),
        ('g', 'ਗ'),
        ('ṅ', 'ਙ'),
        ('c', 'ਚ'),
        ('j', 'ਜ'),
        ('ñ', 'ਞ'),
        ('ṭ', 'ਟ'),
        ('ḍ', 'ਡ'),
        ('ṇ', 'ਣ'),
        ('t', 'ਤ'),
        ('d', 'ਦ'),
        ('n', 'ਨ'),
        ('p', 'ਪ'),
        ('b', 'ਬ'),
        ('m', 'ਮ'),
        ('y', 'ਯ'),
        ('r', 'ਰ'),
        ('l', 'ਲ'),
        ('v', 'ਵ'),
        ('s', 'ਸ'),
        ('ś', '\u{0A36}'), // ਸ਼
        ('h', 'ਹ'),
        ('ṛ', 'ੜ'),
        ('ġ', '\u{0A5A}'), // ਗ਼
        ('z', '\u{0A5B}'), // ਜ਼
        ('f', '\u{0A5E}'), // ਫ਼
        ('ḷ', '\u{0A33}'), // ਲ਼
    ];

    let chars: Vec<char> = roman.chars().collect();
    let mut skeleton = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let mut matched = false;
        if i + 1 < chars.len() {
            let pair: String = chars[i..i + 2].iter().collect();
            if let Some(&(_, gurmukhi)) = DIGRAPHS.iter().find(|(d, _)| *d == pair) {
                skeleton.push(gurmukhi);
                i += 2;
                matched = true;
            }
        }
        if !matched {
            if let Some(&(_, gurmukhi)) = SINGLES.iter().find(|(s, _)| *s == chars[i]) {
                skeleton.push(gurmukhi);
            }
            i += 1;
        }
    }
    skeleton
}

#[cfg(test)]
mod tests {
    use super::*;

    fn practical() -> Romanizer {
        Romanizer::new(RomanScheme::Practical, false)
    }

    #[test]
    fn test_practical_reference_line() {
        let roman = practical().transliterate("ਧੰਨ ਗੁਰੂ ਨਾਨਕ ਦੇਵ ਜੀ");
        assert_eq!(roman, "dhan gurū nānak dev jī");
    }

    #[test]
    fn test_practical_drops_word_final_schwa() {
        assert_eq!(practical().transliterate("ਸਤਿਗੁਰ"), "satigur");
        assert_eq!(practical().transliterate("ਨਾਨਕ"), "nānak");
    }

    #[test]
    fn test_iso_keeps_inherent_vowel() {
        let romanizer = Romanizer::new(RomanScheme::Iso15919, false);
        assert_eq!(romanizer.transliterate("ਨਾਨਕ"), "nānaka");
        assert_eq!(romanizer.transliterate("ਦੇਵ"), "dēva");
    }

    #[test]
    fn test_iast_uses_plain_e_o() {
        let romanizer = Romanizer::new(RomanScheme::Iast, false);
        assert_eq!(romanizer.transliterate("ਦੇਵ"), "deva");
    }

    #[test]
    fn test_adhak_gemination() {
        assert_eq!(practical().transliterate("ਪੱਕਾ"), "pakkā");
    }

    #[test]
    fn test_virama_subjoins() {
        assert_eq!(practical().transliterate("ਸ੍ਰੀ"), "srī");
    }

    #[test]
    fn test_nukta_consonants() {
        assert_eq!(practical().transliterate("ਸ਼ਬਦ"), "shabad");
        assert_eq!(practical().transliterate("ਜ਼ੋਰ"), "zor");
        let iso = Romanizer::new(RomanScheme::Iso15919, false);
        assert_eq!(iso.transliterate("ਸ਼ਬਦ"), "śabada");
    }

    #[test]
    fn test_combining_nukta_equivalent_to_precomposed() {
        // ਜ + combining nukta behaves like the precomposed ਜ਼.
        let composed = practical().transliterate("ਜ਼ੋਰ");
        let combining = practical().transliterate("ਜ\u{0A3C}ੋਰ");
        assert_eq!(composed, combining);
    }

    #[test]
    fn test_nasal_absorbed_before_nasal_consonant() {
        assert_eq!(practical().transliterate("ਧੰਨ"), "dhan");
        // Before a non-nasal consonant the mark is an explicit n.
        assert_eq!(practical().transliterate("ਸੰਤ"), "sant");
    }

    #[test]
    fn test_nasal_final() {
        assert_eq!(practical().transliterate("ਤੂੰ"), "tūn");
        let iso = Romanizer::new(RomanScheme::Iso15919, false);
        assert_eq!(iso.transliterate("ਤੂੰ"), "tūṁ");
    }

    #[test]
    fn test_digits_and_punctuation_pass_through() {
        assert_eq!(practical().transliterate("ਅੰਗ ੧੦"), "ang 10");
    }

    #[test]
    fn test_capitalization_opt_in() {
        let romanizer = Romanizer::new(RomanScheme::Practical, true);
        assert_eq!(romanizer.transliterate("ਗੁਰੂ ਨਾਨਕ"), "Gurū Nānak");
    }

    #[test]
    fn test_empty() {
        assert_eq!(practical().transliterate("  "), "");
    }

    #[test]
    fn test_iso_round_trip_preserves_consonant_skeleton() {
        let iso = Romanizer::new(RomanScheme::Iso15919, false);
        for text in [
            "ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖੁ",
            "ਧੰਨ ਗੁਰੂ ਨਾਨਕ ਦੇਵ ਜੀ",
            "ਸ਼ਬਦ ਜ਼ੋਰ ਫ਼ੌਜ",
        ] {
            let roman = iso.transliterate(text);
            assert_eq!(
                gurmukhi_consonant_skeleton(text),
                roman_consonant_skeleton(&roman),
                "skeleton mismatch for {text} -> {roman}"
            );
        }
    }
}
