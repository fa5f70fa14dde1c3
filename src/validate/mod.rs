//! Consistency checks between source texts and their translations.

use crate::catalog::Catalog;
use crate::config::{has_accelerator, placeholders};
use crate::parse::{MessageKey, TranslationEntry, TranslationStatus};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    /// Marked finished but no text entered
    EmptyTranslation,
    /// `%1`, `%n` ... differ between source and translation
    PlaceholderMismatch,
    /// Only one side marks a keyboard accelerator
    AcceleratorMismatch,
    /// Leading or trailing whitespace differs
    WhitespaceMismatch,
    /// Plural form count does not fit the language
    NumerusFormCount,
}

impl IssueKind {
    /// Stable kebab-case name, as used in machine-readable output
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyTranslation => "empty-translation",
            Self::PlaceholderMismatch => "placeholder-mismatch",
            Self::AcceleratorMismatch => "accelerator-mismatch",
            Self::WhitespaceMismatch => "whitespace-mismatch",
            Self::NumerusFormCount => "numerus-form-count",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::PlaceholderMismatch => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub key: MessageKey,
    pub line: usize,
    pub message: String,
}

impl Issue {
    fn new(kind: IssueKind, entry: &TranslationEntry, message: String) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            key: entry.key(),
            line: entry.line,
            message,
        }
    }
}

/// Check every finished message of `catalog`
pub fn validate(catalog: &Catalog) -> Vec<Issue> {
    let rule = catalog.plural_rule();
    let mut issues = Vec::new();

    for entry in catalog.messages() {
        if entry.status != TranslationStatus::Finished {
            continue;
        }
        if !entry.has_text() {
            issues.push(Issue::new(
                IssueKind::EmptyTranslation,
                entry,
                "finished translation is empty".to_string(),
            ));
            continue;
        }

        if entry.numerus && entry.numerus_forms.len() != rule.form_count() {
            issues.push(Issue::new(
                IssueKind::NumerusFormCount,
                entry,
                format!(
                    "{} plural forms, language expects {}",
                    entry.numerus_forms.len(),
                    rule.form_count()
                ),
            ));
        }

        for text in entry.texts() {
            if text.is_empty() {
                continue;
            }
            check_placeholders(entry, text, &mut issues);
            check_accelerator(entry, text, &mut issues);
            check_whitespace(entry, text, &mut issues);
        }
    }

    issues
}

fn check_placeholders(entry: &TranslationEntry, text: &str, issues: &mut Vec<Issue>) {
    let mut expected = placeholders(&entry.source);
    let mut found = placeholders(text);
    // a plural form may spell out the count ("one file")
    if entry.numerus {
        expected.retain(|p| !p.ends_with('n'));
        found.retain(|p| !p.ends_with('n'));
    }
    if expected != found {
        issues.push(Issue::new(
            IssueKind::PlaceholderMismatch,
            entry,
            format!(
                "placeholders differ: source has [{}], translation has [{}]",
                expected.join(", "),
                found.join(", ")
            ),
        ));
    }
}

fn check_accelerator(entry: &TranslationEntry, text: &str, issues: &mut Vec<Issue>) {
    let in_source = has_accelerator(&entry.source);
    if in_source != has_accelerator(text) {
        let message = if in_source {
            "source has an accelerator (&), translation does not"
        } else {
            "translation has an accelerator (&), source does not"
        };
        issues.push(Issue::new(
            IssueKind::AcceleratorMismatch,
            entry,
            message.to_string(),
        ));
    }
}

fn check_whitespace(entry: &TranslationEntry, text: &str, issues: &mut Vec<Issue>) {
    let source = entry.source.as_str();
    let leading = |s: &str| s.starts_with(char::is_whitespace);
    let trailing = |s: &str| s.ends_with(char::is_whitespace);
    if leading(source) != leading(text) || trailing(source) != trailing(text) {
        issues.push(Issue::new(
            IssueKind::WhitespaceMismatch,
            entry,
            "leading or trailing whitespace differs from source".to_string(),
        ));
    }
}

/// True when any issue is an error
pub fn has_errors(issues: &[Issue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(entries: Vec<TranslationEntry>) -> Catalog {
        let mut catalog = Catalog::new(Some("de".to_string()));
        for entry in entries {
            catalog.insert(entry).unwrap();
        }
        catalog
    }

    #[test]
    fn test_kind_names_match_serialized_form() {
        for kind in [
            IssueKind::EmptyTranslation,
            IssueKind::PlaceholderMismatch,
            IssueKind::AcceleratorMismatch,
            IssueKind::WhitespaceMismatch,
            IssueKind::NumerusFormCount,
        ] {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.as_str());
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn test_clean_catalog() {
        let catalog = catalog(vec![
            TranslationEntry::new("C", "Loading %1 of %2").with_translation("Lade %1 von %2"),
            TranslationEntry::new("C", "&File").with_translation("&Datei"),
            TranslationEntry::new("C", "Not done yet"),
        ]);
        assert!(validate(&catalog).is_empty());
    }

    #[test]
    fn test_placeholder_mismatch() {
        let catalog = catalog(vec![
            TranslationEntry::new("C", "Loading %1 of %2").with_translation("Lade %1")
        ]);
        let issues = validate(&catalog);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::PlaceholderMismatch);
        assert!(has_errors(&issues));
        assert!(issues[0].message.contains("%1, %2"));
    }

    #[test]
    fn test_reordered_placeholders_are_fine() {
        let catalog = catalog(vec![
            TranslationEntry::new("C", "%1 of %2").with_translation("%2 的 %1")
        ]);
        assert!(validate(&catalog).is_empty());
    }

    #[test]
    fn test_warnings() {
        let catalog = catalog(vec![
            TranslationEntry::new("C", "&Open").with_translation("Öffnen"),
            TranslationEntry::new("C", "Name: ").with_translation("Name:"),
            TranslationEntry::new("C", "Empty").with_translation(""),
        ]);
        let kinds: Vec<_> = validate(&catalog).into_iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IssueKind::AcceleratorMismatch,
                IssueKind::WhitespaceMismatch,
                IssueKind::EmptyTranslation,
            ]
        );
    }

    #[test]
    fn test_numerus_checks() {
        let catalog = catalog(vec![TranslationEntry::new("C", "%n file(s)")
            .with_numerus_forms(vec!["eine Datei".into(), "%n Dateien".into(), "x".into()])]);
        let issues = validate(&catalog);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::NumerusFormCount);
        assert!(!has_errors(&issues));
    }
}
