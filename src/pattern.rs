use regex::{Regex, RegexBuilder};
use tracing::warn;

/// A configured text pattern: either a literal case-insensitive substring,
/// or, when the raw form is wrapped in slashes (`/…/`), a case-insensitive
/// regular expression.
///
/// Patterns are parsed once at configuration-resolution time. A malformed
/// regex falls back to literal containment on its inner text; the fallback
/// is logged but never fatal.
#[derive(Debug, Clone)]
pub struct TextPattern {
    raw: String,
    kind: PatternKind,
}

#[derive(Debug, Clone)]
enum PatternKind {
    /// Lowercased needle for substring containment.
    Literal(String),
    Regex(Regex),
}

impl TextPattern {
    pub fn parse(raw: &str) -> Self {
        let kind = if raw.len() >= 2 && raw.starts_with('/') && raw.ends_with('/') {
            let inner = &raw[1..raw.len() - 1];
            match RegexBuilder::new(inner).case_insensitive(true).build() {
                Ok(regex) => PatternKind::Regex(regex),
                Err(err) => {
                    warn!(pattern = raw, %err, "malformed regex pattern, using literal match");
                    PatternKind::Literal(inner.to_lowercase())
                }
            }
        } else {
            PatternKind::Literal(raw.to_lowercase())
        };
        Self {
            raw: raw.to_string(),
            kind,
        }
    }

    /// Returns true if the pattern matches anywhere in the given text.
    pub fn matches(&self, text: &str) -> bool {
        match &self.kind {
            PatternKind::Literal(needle) => {
                !needle.is_empty() && text.to_lowercase().contains(needle)
            }
            PatternKind::Regex(regex) => regex.is_match(text),
        }
    }

    /// The pattern as written in the configuration.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl std::fmt::Display for TextPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for TextPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for TextPattern {}

impl From<&str> for TextPattern {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

#[cfg(feature = "serialization")]
impl serde::Serialize for TextPattern {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

#[cfg(feature = "serialization")]
impl<'de> serde::Deserialize<'de> for TextPattern {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
        Ok(TextPattern::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_is_case_insensitive() {
        let pattern = TextPattern::parse("Destroy target");
        assert!(pattern.matches("destroy target creature"));
        assert!(pattern.matches("DESTROY TARGET CREATURE"));
        assert!(!pattern.matches("exile target creature"));
    }

    #[test]
    fn test_regex_pattern() {
        let pattern = TextPattern::parse("/draw (a|two) cards?/");
        assert!(pattern.matches("Draw a card."));
        assert!(pattern.matches("draw two cards, then discard"));
        assert!(!pattern.matches("draw three cards"));
    }

    #[test]
    fn test_malformed_regex_falls_back_to_literal() {
        let pattern = TextPattern::parse("/[unclosed/");
        assert!(pattern.matches("this text has [unclosed brackets"));
        assert!(!pattern.matches("nothing to see"));
    }

    #[test]
    fn test_empty_literal_never_matches() {
        let pattern = TextPattern::parse("");
        assert!(!pattern.matches("anything"));
    }

    #[test]
    fn test_slash_only_is_literal() {
        // A single slash is not a delimited regex.
        let pattern = TextPattern::parse("/");
        assert!(pattern.matches("either/or"));
    }
}
