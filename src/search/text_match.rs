use regex::{Regex, RegexBuilder};
use std::ops::Range;

/// Compiled form of a user query: literal or regex, with case and
/// whole-word options.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    regex: Regex,
}

impl TextMatcher {
    /// Build a matcher. Literal queries are escaped before compiling.
    pub fn new(
        text: &str,
        case_sensitive: bool,
        word_match: bool,
        is_regex: bool,
    ) -> Result<Self, regex::Error> {
        let body = if is_regex {
            text.to_string()
        } else {
            regex::escape(text)
        };
        let pattern = if word_match {
            format!(r"\b(?:{})\b", body)
        } else {
            body
        };
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(!case_sensitive)
            .build()?;
        Ok(Self { regex })
    }

    /// Case-insensitive literal matcher
    pub fn literal(text: &str) -> Self {
        let regex = RegexBuilder::new(&regex::escape(text))
            .case_insensitive(true)
            .build()
            .unwrap_or_else(|_| Regex::new("$^").expect("empty pattern is valid"));
        Self { regex }
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }

    /// Byte ranges of every match, for highlighting
    pub fn find_ranges(&self, haystack: &str) -> Vec<Range<usize>> {
        self.regex.find_iter(haystack).map(|m| m.range()).collect()
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_is_escaped() {
        let matcher = TextMatcher::new("%1 (%2)", false, false, false).unwrap();
        assert!(matcher.is_match("Loading %1 (%2)..."));
        assert!(!matcher.is_match("Loading %1 %2"));
    }

    #[test]
    fn test_case_sensitivity() {
        let insensitive = TextMatcher::new("save", false, false, false).unwrap();
        assert!(insensitive.is_match("Save State"));

        let sensitive = TextMatcher::new("save", true, false, false).unwrap();
        assert!(!sensitive.is_match("Save State"));
    }

    #[test]
    fn test_word_match() {
        let matcher = TextMatcher::new("Save", false, true, false).unwrap();
        assert!(matcher.is_match("Save State"));
        assert!(!matcher.is_match("Savestate"));
    }

    #[test]
    fn test_regex_query() {
        let matcher = TextMatcher::new(r"^Configure\w+", true, false, true).unwrap();
        assert!(matcher.is_match("ConfigureAudio"));
        assert!(TextMatcher::new("(unclosed", false, false, true).is_err());
    }

    #[test]
    fn test_find_ranges() {
        let matcher = TextMatcher::literal("ab");
        assert_eq!(matcher.find_ranges("xxABxab"), vec![2..4, 5..7]);
    }
}
