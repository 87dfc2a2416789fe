//! Domain prompts that bias decoding toward scripture vocabulary.

use katha_config::DomainMode;

/// Initial prompt for the configured domain, or `None` for generic
/// Punjabi. Decoders that support conditioning text use this to pull
/// the hypothesis toward Gurbani spellings.
pub fn gurbani_prompt(mode: DomainMode) -> Option<String> {
    match mode {
        DomainMode::Sggs => Some(
            "ਵਾਹਿਗੁਰੂ ਜੀ ਕਾ ਖਾਲਸਾ ਵਾਹਿਗੁਰੂ ਜੀ ਕੀ ਫਤਿਹ। ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖੁ ਨਿਰਭਉ ਨਿਰਵੈਰੁ \
             ਅਕਾਲ ਮੂਰਤਿ ਅਜੂਨੀ ਸੈਭੰ ਗੁਰ ਪ੍ਰਸਾਦਿ। ਗੁਰਬਾਣੀ ਕਥਾ ਸ਼ਬਦ ਸਤਿਗੁਰੂ ਸਿਮਰਨ ਹੁਕਮ ਰਜਾਈ।"
                .to_string(),
        ),
        DomainMode::Dasam => Some(
            "ਦਸਮ ਗ੍ਰੰਥ ਸਾਹਿਬ ਦੀ ਬਾਣੀ। ਜਾਪੁ ਸਾਹਿਬ ਅਕਾਲ ਉਸਤਤਿ ਚੰਡੀ ਦੀ ਵਾਰ। \
             ਦੇਹ ਸਿਵਾ ਬਰੁ ਮੋਹਿ ਇਹੈ ਸੁਭ ਕਰਮਨ ਤੇ ਕਬਹੂੰ ਨ ਟਰੋਂ।"
                .to_string(),
        ),
        DomainMode::Generic => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sggs_prompt_carries_mool_mantar() {
        let prompt = gurbani_prompt(DomainMode::Sggs).unwrap();
        assert!(prompt.contains("ਸਤਿ ਨਾਮੁ"));
    }

    #[test]
    fn test_generic_has_none() {
        assert!(gurbani_prompt(DomainMode::Generic).is_none());
    }
}
