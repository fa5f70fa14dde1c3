pub mod catalog;
pub mod config;
pub mod error;
pub mod locale;
pub mod output;
pub mod parse;
pub mod search;
pub mod validate;

use serde::Serialize;
use std::path::PathBuf;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogStats, MergeReport, PluralRule};
pub use error::{CatalogError, Result};
pub use locale::{LocaleRegistry, Translator};
pub use output::{ReportFormatter, SimpleFormatter, TsWriter};
pub use parse::{Location, MessageKey, TranslationEntry, TranslationStatus, TsParser};
pub use search::{CatalogScanner, MatchField, SearchHit, SkippedFile, TextMatcher};
pub use validate::{validate, Issue, IssueKind, Severity};

/// Query parameters for searching
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub case_sensitive: bool,
    pub word_match: bool,
    pub is_regex: bool,
    pub search_context: bool,
    pub base_dir: Option<PathBuf>,
    pub exclude_patterns: Vec<String>,
}

impl SearchQuery {
    pub fn new(text: String) -> Self {
        Self {
            text,
            case_sensitive: false,
            word_match: false,
            is_regex: false,
            search_context: false,
            base_dir: None,
            exclude_patterns: Vec::new(),
        }
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_word_match(mut self, word_match: bool) -> Self {
        self.word_match = word_match;
        self
    }

    pub fn with_regex(mut self, is_regex: bool) -> Self {
        self.is_regex = is_regex;
        self
    }

    pub fn with_search_context(mut self, search_context: bool) -> Self {
        self.search_context = search_context;
        self
    }

    pub fn with_base_dir(mut self, base_dir: PathBuf) -> Self {
        self.base_dir = Some(base_dir);
        self
    }

    pub fn with_exclusions(mut self, exclusions: Vec<String>) -> Self {
        self.exclude_patterns = exclusions;
        self
    }

    /// Compile the query text into a matcher
    pub fn matcher(&self) -> Result<TextMatcher> {
        TextMatcher::new(&self.text, self.case_sensitive, self.word_match, self.is_regex).map_err(
            |e| CatalogError::InvalidPattern {
                pattern: self.text.clone(),
                reason: e.to_string(),
            },
        )
    }
}

/// Result of a search operation
#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub query: String,
    pub hits: Vec<SearchHit>,
    pub skipped: Vec<SkippedFile>,
    /// Number of catalogues that were loaded and searched
    pub scanned: usize,
}

/// Search every translation catalogue under the query's base directory
/// (the current directory by default) for messages matching the query.
///
/// Directories that are build output for the detected project type are
/// skipped, and so are files that fail to load; those are listed in
/// [`SearchResult::skipped`].
#[must_use = "this function returns a Result that should be handled"]
pub fn run_search(query: SearchQuery) -> Result<SearchResult> {
    let base_dir = query
        .base_dir
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    if !base_dir.exists() {
        return Err(CatalogError::file_io(
            &base_dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
        ));
    }

    let matcher = query.matcher()?;

    let project_dir = if base_dir.is_file() {
        base_dir.parent().map(PathBuf::from).unwrap_or_default()
    } else {
        base_dir.clone()
    };
    let project_type = config::detect_project_type(&project_dir);
    let mut exclusions: Vec<String> = config::get_default_exclusions(project_type)
        .iter()
        .map(|&s| s.to_string())
        .collect();
    exclusions.extend(query.exclude_patterns.iter().cloned());
    tracing::debug!(?project_type, dir = %base_dir.display(), "searching catalogues");

    let mut scanner = CatalogScanner::new();
    scanner.set_exclusions(exclusions);
    scanner.set_search_context(query.search_context);
    let outcome = scanner.scan(&base_dir, &matcher)?;

    Ok(SearchResult {
        query: query.text,
        hits: outcome.hits,
        skipped: outcome.skipped,
        scanned: outcome.scanned,
    })
}
