//! Caller-facing language selection
//!
//! The set-language command accepts either the literal token `auto` or an
//! explicit language tag. Tags are passed through verbatim — an unrecognized
//! tag is handed to the recognition engine as-is rather than rejected.

/// How the active language tag is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageMode {
    /// Detection on recognized text drives the active tag
    Auto,
    /// Caller-pinned tag; detection-driven switching is disabled
    Fixed(String),
}

impl LanguageMode {
    /// Parse a set-language argument: `auto` (any casing, surrounding
    /// whitespace ignored) selects Auto, anything else is a fixed tag.
    pub fn parse(arg: &str) -> Self {
        let trimmed = arg.trim();
        if trimmed.eq_ignore_ascii_case("auto") {
            Self::Auto
        } else {
            Self::Fixed(trimmed.to_string())
        }
    }

    /// Whether detection is allowed to change the active tag.
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl std::fmt::Display for LanguageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LanguageMode::Auto => write!(f, "auto"),
            LanguageMode::Fixed(tag) => write!(f, "{}", tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auto() {
        assert_eq!(LanguageMode::parse("auto"), LanguageMode::Auto);
        assert_eq!(LanguageMode::parse("AUTO"), LanguageMode::Auto);
        assert_eq!(LanguageMode::parse("  Auto "), LanguageMode::Auto);
    }

    #[test]
    fn test_parse_fixed_tag() {
        assert_eq!(
            LanguageMode::parse("fr-FR"),
            LanguageMode::Fixed("fr-FR".to_string())
        );
    }

    #[test]
    fn test_unknown_tag_is_kept_verbatim() {
        // Permissive: the engine decides what to do with it
        assert_eq!(
            LanguageMode::parse("tlh-KL"),
            LanguageMode::Fixed("tlh-KL".to_string())
        );
    }

    #[test]
    fn test_is_auto() {
        assert!(LanguageMode::Auto.is_auto());
        assert!(!LanguageMode::Fixed("en-US".into()).is_auto());
    }
}
