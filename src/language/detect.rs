//! Keyword-based language detection heuristic
//!
//! Maps a recognized text fragment to a best-guess BCP-47 language tag by
//! substring-matching against small per-language keyword tables. This is a
//! lexical best-effort guess, never authoritative: when nothing matches,
//! the caller's fallback tag is returned unchanged.

/// Language tag used before any detection has happened.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Per-language keyword table, checked in order; the first language with a
/// substring hit wins, so ties resolve identically every run.
///
/// English has no row: it is the default tag, not a detection target, so
/// English text yields no new evidence and leaves the active tag alone.
/// (en-GB is likewise selectable only as a fixed tag.)
const KEYWORD_TABLE: &[(&str, &[&str])] = &[
    ("es-ES", &["gracias", "hola", "buenos", "por favor", "muchas"]),
    ("fr-FR", &["bonjour", "merci", "s'il vous", "oui", "beaucoup"]),
    ("de-DE", &["danke", "hallo", "bitte", "guten", "nicht"]),
    ("it-IT", &["grazie", "ciao", "prego", "buongiorno", "molto"]),
    ("ro-RO", &["mulțumesc", "bună", "foarte", "te rog", "noroc"]),
    ("ru-RU", &["спасибо", "привет", "пожалуйста", "да", "хорошо"]),
    ("zh-CN", &["你好", "谢谢", "请", "是的", "再见"]),
    ("ja-JP", &["こんにちは", "ありがとう", "はい", "ください", "さようなら"]),
];

/// Guess the language of `text`, returning `fallback` when no keyword of any
/// language occurs in it.
///
/// Matching is case-insensitive substring containment over the lower-cased
/// input. Pure and total: empty input, whitespace, or text in an unknown
/// language all come back as `fallback`.
pub fn detect(text: &str, fallback: &str) -> String {
    let lowered = text.to_lowercase();
    for (tag, keywords) in KEYWORD_TABLE {
        if keywords.iter().any(|kw| lowered.contains(kw)) {
            return (*tag).to_string();
        }
    }
    fallback.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_returns_fallback() {
        assert_eq!(detect("", "en-US"), "en-US");
        assert_eq!(detect("   ", "fr-FR"), "fr-FR");
    }

    #[test]
    fn test_no_keyword_returns_fallback() {
        // Real words, but none of them are in any table row
        assert_eq!(detect("turn left at the red door", "es-ES"), "es-ES");
    }

    #[test]
    fn test_spanish_keyword() {
        assert_eq!(detect("gracias amigo", "en-US"), "es-ES");
    }

    #[test]
    fn test_detection_is_case_insensitive() {
        assert_eq!(detect("GRACIAS Amigo", "en-US"), "es-ES");
        assert_eq!(detect("Danke schön", "en-US"), "de-DE");
    }

    #[test]
    fn test_english_text_is_not_a_trigger() {
        // English is the default, not a detection target: once Spanish was
        // detected, English speech alone never switches the tag back.
        assert_eq!(detect("hello there", "es-ES"), "es-ES");
        assert_eq!(detect("thank you please", "es-ES"), "es-ES");
    }

    #[test]
    fn test_cyrillic_and_cjk() {
        assert_eq!(detect("спасибо большое", "en-US"), "ru-RU");
        assert_eq!(detect("你好世界", "en-US"), "zh-CN");
        assert_eq!(detect("ありがとうございます", "en-US"), "ja-JP");
    }

    #[test]
    fn test_table_order_breaks_ties() {
        // "gracias" (es-ES) and "merci" (fr-FR) in one fragment: the Spanish
        // row comes first in the table, so Spanish wins every run.
        assert_eq!(detect("gracias merci", "en-US"), "es-ES");
    }

    #[test]
    fn test_unknown_fallback_passes_through() {
        // The fallback is not validated against the table
        assert_eq!(detect("qwerty", "xx-XX"), "xx-XX");
    }
}
