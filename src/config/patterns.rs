use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%L?(?:[1-9][0-9]?|n)").expect("placeholder pattern is valid")
});

// `&&` is a literal ampersand, `&x` marks x as the keyboard accelerator
static ACCELERATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(&|[^&\s])").expect("accelerator pattern is valid"));

/// Qt argument placeholders: `%1` .. `%99`, `%n`, and their `%L` variants
pub fn placeholder_pattern() -> &'static Regex {
    &PLACEHOLDER
}

pub fn accelerator_pattern() -> &'static Regex {
    &ACCELERATOR
}

/// Placeholders in `text`, sorted, duplicates kept
pub fn placeholders(text: &str) -> Vec<&str> {
    let mut found: Vec<&str> = PLACEHOLDER.find_iter(text).map(|m| m.as_str()).collect();
    found.sort_unstable();
    found
}

/// True when `text` marks an accelerator key. Rich text is never checked
/// because its entities look like accelerators.
pub fn has_accelerator(text: &str) -> bool {
    if text.trim_start().starts_with('<') {
        return false;
    }
    ACCELERATOR
        .captures_iter(text)
        .any(|caps| caps.get(1).is_some_and(|m| m.as_str() != "&"))
}
