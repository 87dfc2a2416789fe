//! Gurmukhi codepoint classification.

/// Tippi, the nasalization mark used before consonants.
pub const TIPPI: char = '\u{0A70}';
/// Bindi, the nasalization mark used before vowels.
pub const BINDI: char = '\u{0A02}';
/// Adhak, gemination of the following consonant.
pub const ADHAK: char = '\u{0A71}';
/// Nukta, dot below producing a distinct consonant.
pub const NUKTA: char = '\u{0A3C}';
/// Virama, subjoins the following consonant.
pub const VIRAMA: char = '\u{0A4D}';

pub fn is_gurmukhi(c: char) -> bool {
    ('\u{0A00}'..='\u{0A7F}').contains(&c)
}

pub fn is_shahmukhi(c: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&c)
}

pub fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

pub fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || (c.is_alphabetic() && (c as u32) < 0x100)
}

/// Base Gurmukhi consonants, including the precomposed nukta forms.
pub fn is_consonant(c: char) -> bool {
    // 0A15–0A39 covers the base grid including ਲ਼ and ਸ਼; 0A59–0A5E are
    // the remaining precomposed nukta letters.
    matches!(c, '\u{0A15}'..='\u{0A39}' | '\u{0A59}'..='\u{0A5C}' | '\u{0A5E}')
}

/// Nasal consonants, which absorb a preceding nasal mark in the practical
/// romanization.
pub fn is_nasal_consonant(c: char) -> bool {
    matches!(c, 'ਙ' | 'ਞ' | 'ਣ' | 'ਨ' | 'ਮ')
}

pub fn is_independent_vowel(c: char) -> bool {
    matches!(
        c,
        'ਅ' | 'ਆ' | 'ਇ' | 'ਈ' | 'ਉ' | 'ਊ' | 'ਏ' | 'ਐ' | 'ਓ' | 'ਔ'
    )
}

/// Dependent vowel signs (matras).
pub fn is_vowel_sign(c: char) -> bool {
    matches!(
        c,
        '\u{0A3E}' | '\u{0A3F}' | '\u{0A40}' | '\u{0A41}' | '\u{0A42}' | '\u{0A47}'
            | '\u{0A48}' | '\u{0A4B}' | '\u{0A4C}'
    )
}

pub fn is_nasal_mark(c: char) -> bool {
    c == TIPPI || c == BINDI
}

/// Any combining mark that attaches to a preceding base.
pub fn is_combining_mark(c: char) -> bool {
    is_vowel_sign(c) || is_nasal_mark(c) || matches!(c, NUKTA | ADHAK | VIRAMA)
}

/// Share of Gurmukhi codepoints among alphabetic codepoints. Used by the
/// strict-Gurmukhi purity check.
pub fn gurmukhi_purity(text: &str) -> f32 {
    let mut gurmukhi = 0usize;
    let mut total = 0usize;
    for c in text.chars() {
        if c.is_whitespace() || c.is_ascii_punctuation() || c.is_ascii_digit() {
            continue;
        }
        total += 1;
        if is_gurmukhi(c) {
            gurmukhi += 1;
        }
    }
    if total == 0 {
        1.0
    } else {
        gurmukhi as f32 / total as f32
    }
}
