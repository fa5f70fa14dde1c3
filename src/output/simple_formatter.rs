use crate::validate::Issue;
use crate::SearchResult;
use std::path::Path;

/// Formatter for simple, machine-readable output (grep-compatible)
pub struct SimpleFormatter;

impl SimpleFormatter {
    pub fn new() -> Self {
        Self
    }

    /// One line per hit: `file:line:context:source: 'translation'`
    pub fn format(&self, result: &SearchResult) -> String {
        let mut output = String::new();

        for hit in &result.hits {
            let entry = &hit.entry;
            let line = format!(
                "{}:{}:{}:{}: '{}'",
                hit.file.display(),
                entry.line,
                entry.context,
                one_line(&entry.source),
                one_line(&entry.texts().join(" | "))
            );
            output.push_str(&line);
            output.push('\n');
        }

        output
    }

    /// One line per issue: `file:line:severity:kind:message`
    pub fn format_issues(&self, file: &Path, issues: &[Issue]) -> String {
        let mut output = String::new();
        for issue in issues {
            output.push_str(&format!(
                "{}:{}:{}:{}:{}\n",
                file.display(),
                issue.line,
                issue.severity,
                issue.kind.as_str(),
                issue.message
            ));
        }
        output
    }
}

impl Default for SimpleFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep each record on a single line
fn one_line(s: &str) -> String {
    s.replace('\n', "\\n")
}
