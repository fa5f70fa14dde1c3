// src/search/catalog_search.rs

use crate::error::Result;
use crate::parse::{TranslationEntry, TsParser};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::text_match::TextMatcher;

/// Which part of a message matched the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Source,
    Translation,
    Comment,
    Context,
}

/// A message that matched a search, with the catalogue it lives in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub file: PathBuf,
    pub language: Option<String>,
    pub field: MatchField,
    pub entry: TranslationEntry,
}

/// A `.ts` file that could not be loaded during a scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFile {
    pub file: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub hits: Vec<SearchHit>,
    pub skipped: Vec<SkippedFile>,
    pub scanned: usize,
}

/// `CatalogScanner` walks a directory tree for translation catalogues and
/// collects the messages whose text matches a query.
pub struct CatalogScanner {
    exclusions: Vec<String>,
    search_context: bool,
}

impl Default for CatalogScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogScanner {
    pub fn new() -> Self {
        Self {
            exclusions: Vec::new(),
            search_context: false,
        }
    }

    /// Set exclusion patterns (directory or file names to ignore)
    pub fn set_exclusions(&mut self, exclusions: Vec<String>) {
        self.exclusions = exclusions;
    }

    /// Also match against context names
    pub fn set_search_context(&mut self, search_context: bool) {
        self.search_context = search_context;
    }

    /// Scan `base` (a directory or a single file). Files that fail to load
    /// are reported in `skipped` instead of aborting the scan.
    pub fn scan(&self, base: &Path, matcher: &TextMatcher) -> Result<ScanOutcome> {
        let mut outcome = ScanOutcome::default();

        for path in self.catalogue_files(base) {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "skipping unreadable file");
                    outcome.skipped.push(SkippedFile {
                        file: path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            // `.ts` is also TypeScript
            if !TsParser::looks_like_ts(&content) {
                tracing::trace!(file = %path.display(), "not a translation catalogue");
                continue;
            }

            let catalog = match TsParser::parse_str(&content, &path) {
                Ok(catalog) => catalog,
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "skipping invalid catalogue");
                    outcome.skipped.push(SkippedFile {
                        file: path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            outcome.scanned += 1;

            for entry in catalog.messages() {
                if let Some(field) = self.matching_field(entry, matcher) {
                    outcome.hits.push(SearchHit {
                        file: path.clone(),
                        language: catalog.language.clone(),
                        field,
                        entry: entry.clone(),
                    });
                }
            }
        }

        tracing::debug!(
            scanned = outcome.scanned,
            hits = outcome.hits.len(),
            skipped = outcome.skipped.len(),
            "catalogue scan finished"
        );
        Ok(outcome)
    }

    fn matching_field(&self, entry: &TranslationEntry, matcher: &TextMatcher) -> Option<MatchField> {
        if matcher.is_match(&entry.source) {
            return Some(MatchField::Source);
        }
        if entry.texts().iter().any(|t| matcher.is_match(t)) {
            return Some(MatchField::Translation);
        }
        let comments = [&entry.comment, &entry.extra_comment, &entry.translator_comment];
        if comments
            .iter()
            .any(|c| c.as_deref().is_some_and(|c| matcher.is_match(c)))
        {
            return Some(MatchField::Comment);
        }
        if self.search_context && matcher.is_match(&entry.context) {
            return Some(MatchField::Context);
        }
        None
    }

    /// `.ts` files under `base`, sorted for stable output
    fn catalogue_files(&self, base: &Path) -> Vec<PathBuf> {
        if base.is_file() {
            return vec![base.to_path_buf()];
        }

        let mut files: Vec<PathBuf> = WalkDir::new(base)
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 {
                    return true;
                }
                let name = e.file_name().to_string_lossy();
                !self.exclusions.iter().any(|excl| name == excl.as_str())
            })
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "ts"))
            .map(|e| e.into_path())
            .collect();
        files.sort();
        files
    }
}
