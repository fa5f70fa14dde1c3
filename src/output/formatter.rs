use crate::catalog::{CatalogStats, MergeReport};
use crate::parse::{TranslationEntry, TranslationStatus};
use crate::search::{SearchHit, TextMatcher};
use crate::validate::{Issue, Severity};
use crate::SearchResult;
use colored::*;
use std::path::Path;

/// Formatter for the human-readable, colored reports of the CLI
pub struct ReportFormatter {
    max_width: usize,
}

impl ReportFormatter {
    /// Create a new ReportFormatter with default width (80 columns)
    pub fn new() -> Self {
        Self { max_width: 80 }
    }

    /// Create a ReportFormatter with custom width
    pub fn with_width(max_width: usize) -> Self {
        Self { max_width }
    }

    /// Search hits grouped per catalogue, matches in bold
    pub fn format_search(&self, result: &SearchResult, matcher: &TextMatcher) -> String {
        let mut output = String::new();
        let mut current: Option<&Path> = None;

        for hit in &result.hits {
            if current != Some(hit.file.as_path()) {
                if current.is_some() {
                    output.push('\n');
                }
                output.push_str(&self.file_header(hit));
                output.push('\n');
                current = Some(hit.file.as_path());
            }
            output.push_str(&self.format_hit(hit, matcher));
        }

        for skipped in &result.skipped {
            output.push_str(&format!(
                "{} {}: {}\n",
                "skipped".yellow(),
                skipped.file.display(),
                first_line(&skipped.reason)
            ));
        }
        output
    }

    fn file_header(&self, hit: &SearchHit) -> String {
        let header = match &hit.language {
            Some(language) => format!("=== {} ({}) ===", hit.file.display(), language),
            None => format!("=== {} ===", hit.file.display()),
        };
        header.bold().to_string()
    }

    fn format_hit(&self, hit: &SearchHit, matcher: &TextMatcher) -> String {
        let entry = &hit.entry;
        let mut output = format!(
            "{}:{} {}\n",
            entry.line,
            entry.context.cyan(),
            highlight(&self.truncate(&entry.source, self.max_width.saturating_sub(20)), matcher)
        );
        if let Some(comment) = &entry.comment {
            output.push_str(&format!("    ({})\n", highlight(comment, matcher)));
        }
        if !entry.has_text() {
            output.push_str(&format!("    -> {}\n", "(untranslated)".dimmed()));
            return output;
        }
        for text in entry.texts() {
            let text = self.truncate(text, self.max_width.saturating_sub(10));
            output.push_str(&format!("    -> {}", highlight(&text, matcher)));
            if let Some(label) = status_label(entry) {
                output.push_str(&format!(" {}", label));
            }
            output.push('\n');
        }
        output
    }

    /// One line of statistics for a catalogue
    pub fn format_stats(&self, file: &Path, language: Option<&str>, stats: &CatalogStats) -> String {
        let completion = stats.completion();
        let percent = format!("{:5.1}%", completion);
        let percent = if completion >= 100.0 {
            percent.green()
        } else if completion >= 50.0 {
            percent.yellow()
        } else {
            percent.red()
        };
        format!(
            "{} {} [{}] {} messages: {} finished, {} unfinished, {} vanished, {} obsolete\n",
            percent,
            file.display(),
            language.unwrap_or("?"),
            stats.total,
            stats.finished,
            stats.unfinished,
            stats.vanished,
            stats.obsolete
        )
    }

    /// Validation issues of one catalogue, then a summary line
    pub fn format_issues(&self, file: &Path, issues: &[Issue]) -> String {
        let mut output = String::new();
        for issue in issues {
            let severity = match issue.severity {
                Severity::Error => "error".red().bold(),
                Severity::Warning => "warning".yellow(),
            };
            output.push_str(&format!(
                "{}:{}: {}[{}]: {}: {}\n",
                file.display(),
                issue.line,
                severity,
                issue.kind.as_str(),
                issue.key,
                issue.message
            ));
        }

        let errors = issues.iter().filter(|i| i.severity == Severity::Error).count();
        let warnings = issues.len() - errors;
        let summary = format!(
            "{}: {} error(s), {} warning(s)",
            file.display(),
            errors,
            warnings
        );
        if errors > 0 {
            output.push_str(&summary.red().to_string());
        } else if warnings > 0 {
            output.push_str(&summary.yellow().to_string());
        } else {
            output.push_str(&format!("{}: {}", file.display(), "ok".green()));
        }
        output.push('\n');
        output
    }

    pub fn format_merge(&self, file: &Path, report: &MergeReport) -> String {
        format!(
            "{}: {} kept, {} added, {} revived, {} vanished, {} dropped\n",
            file.display(),
            report.kept,
            report.added,
            report.revived,
            report.vanished,
            report.dropped
        )
    }

    /// Truncate a string to fit within max length (in characters)
    fn truncate(&self, s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", kept)
        }
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn status_label(entry: &TranslationEntry) -> Option<ColoredString> {
    match entry.status {
        TranslationStatus::Finished => None,
        TranslationStatus::Unfinished => Some("[unfinished]".yellow()),
        TranslationStatus::Vanished => Some("[vanished]".dimmed()),
        TranslationStatus::Obsolete => Some("[obsolete]".dimmed()),
    }
}

fn highlight(text: &str, matcher: &TextMatcher) -> String {
    let mut output = String::with_capacity(text.len());
    let mut last = 0;
    for range in matcher.find_ranges(text) {
        if range.is_empty() {
            continue;
        }
        output.push_str(&text[last..range.start]);
        output.push_str(&text[range.clone()].bold().to_string());
        last = range.end;
    }
    output.push_str(&text[last..]);
    output
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or(s)
}
