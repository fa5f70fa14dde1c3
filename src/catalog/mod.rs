pub mod merge;
pub mod numerus;

pub use merge::MergeReport;
pub use numerus::PluralRule;

use crate::error::{CatalogError, Result};
use crate::parse::{MessageKey, TranslationEntry, TranslationStatus};
use hashbrown::{Equivalent, HashMap};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// TS format version written by current Qt tools
pub const DEFAULT_TS_VERSION: &str = "2.1";

/// Messages belonging to one UI component, in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub name: String,
    pub comment: Option<String>,
    messages: Vec<TranslationEntry>,
}

impl Context {
    pub fn messages(&self) -> &[TranslationEntry] {
        &self.messages
    }
}

/// Borrowed form of [`MessageKey`], hashes identically
#[derive(Hash)]
struct KeyRef<'a> {
    context: &'a str,
    source: &'a str,
    comment: &'a str,
}

impl Equivalent<MessageKey> for KeyRef<'_> {
    fn equivalent(&self, key: &MessageKey) -> bool {
        self.context == key.context && self.source == key.source && self.comment == key.comment
    }
}

/// Counts of messages per translation state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub total: usize,
    pub finished: usize,
    pub unfinished: usize,
    pub vanished: usize,
    pub obsolete: usize,
}

impl CatalogStats {
    /// Share of live messages that are finished, in percent
    pub fn completion(&self) -> f64 {
        let live = self.finished + self.unfinished;
        if live == 0 {
            100.0
        } else {
            self.finished as f64 * 100.0 / live as f64
        }
    }
}

/// An in-memory translation catalogue: the lookup table for one language.
///
/// Keys are (context, source, disambiguation comment) and are unique. A
/// catalogue is built by the loader (or [`Catalog::insert`]) and then only
/// read; share it as `Arc<Catalog>`.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub version: String,
    pub language: Option<String>,
    pub source_language: Option<String>,
    /// Catalogues this one depends on (`<dependency catalog="..."/>`)
    pub dependencies: Vec<String>,
    /// File the catalogue was loaded from
    pub path: Option<PathBuf>,
    contexts: Vec<Context>,
    context_index: HashMap<String, usize>,
    index: HashMap<MessageKey, (usize, usize)>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Catalog {
    pub fn new(language: Option<String>) -> Self {
        Self {
            version: DEFAULT_TS_VERSION.to_string(),
            language,
            source_language: None,
            dependencies: Vec::new(),
            path: None,
            contexts: Vec::new(),
            context_index: HashMap::new(),
            index: HashMap::new(),
        }
    }

    /// Empty catalogue carrying the header of `other`
    pub fn with_header_of(other: &Catalog) -> Self {
        Self {
            version: other.version.clone(),
            language: other.language.clone(),
            source_language: other.source_language.clone(),
            dependencies: other.dependencies.clone(),
            path: other.path.clone(),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.context_index.get(name).map(|&i| &self.contexts[i])
    }

    /// All messages in file order
    pub fn messages(&self) -> impl Iterator<Item = &TranslationEntry> {
        self.contexts.iter().flat_map(|c| c.messages.iter())
    }

    /// Return the index of `name`, appending an empty context if needed
    pub fn ensure_context(&mut self, name: &str) -> usize {
        if let Some(&i) = self.context_index.get(name) {
            return i;
        }
        self.contexts.push(Context {
            name: name.to_string(),
            comment: None,
            messages: Vec::new(),
        });
        let i = self.contexts.len() - 1;
        self.context_index.insert(name.to_string(), i);
        i
    }

    pub fn set_context_comment(&mut self, name: &str, comment: Option<String>) {
        let i = self.ensure_context(name);
        self.contexts[i].comment = comment;
    }

    /// Add a message. Fails if its (context, source, comment) key is taken.
    pub fn insert(&mut self, entry: TranslationEntry) -> Result<()> {
        let key = entry.key();
        if self.index.contains_key(&key) {
            return Err(CatalogError::DuplicateMessage {
                file: self
                    .path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("<memory>")),
                line: entry.line,
                context: key.context,
                source_text: key.source,
                comment: key.comment,
            });
        }
        let ci = self.ensure_context(&entry.context);
        let mi = self.contexts[ci].messages.len();
        self.contexts[ci].messages.push(entry);
        self.index.insert(key, (ci, mi));
        Ok(())
    }

    /// Exact lookup by key
    pub fn lookup(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
    ) -> Option<&TranslationEntry> {
        let key = KeyRef {
            context,
            source,
            comment: comment.unwrap_or_default(),
        };
        self.index
            .get(&key)
            .map(|&(ci, mi)| &self.contexts[ci].messages[mi])
    }

    pub fn lookup_key(&self, key: &MessageKey) -> Option<&TranslationEntry> {
        self.lookup(&key.context, &key.source, Some(&key.comment))
    }

    /// Lookup used at display time: a disambiguated request that has no
    /// entry of its own falls back to the undisambiguated message.
    fn find(&self, context: &str, source: &str, comment: Option<&str>) -> Option<&TranslationEntry> {
        match self.lookup(context, source, comment) {
            Some(entry) => Some(entry),
            None if comment.is_some_and(|c| !c.is_empty()) => {
                tracing::trace!(context, source, "retrying lookup without comment");
                self.lookup(context, source, None)
            }
            None => None,
        }
    }

    /// Display string for a message: the translation when it is finished,
    /// otherwise `source` itself. Placeholders are returned untouched.
    pub fn translate<'a>(&'a self, context: &str, source: &'a str, comment: Option<&str>) -> &'a str {
        match self.find(context, source, comment) {
            Some(entry) if entry.is_usable() => {
                if entry.numerus {
                    entry
                        .numerus_forms
                        .iter()
                        .find(|f| !f.is_empty())
                        .map(String::as_str)
                        .unwrap_or(source)
                } else {
                    &entry.translation
                }
            }
            _ => {
                tracing::trace!(context, source, "no finished translation, using source text");
                source
            }
        }
    }

    /// Display string for a plural message and count `n`. `%n` is left in place.
    pub fn translate_plural<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: Option<&str>,
        n: i64,
    ) -> &'a str {
        let Some(entry) = self.find(context, source, comment) else {
            return source;
        };
        if !entry.is_usable() {
            return source;
        }
        if !entry.numerus {
            return &entry.translation;
        }
        let index = self.plural_rule().form_index(n);
        match entry.numerus_forms.get(index) {
            Some(form) if !form.is_empty() => form,
            _ => source,
        }
    }

    pub fn status(&self, context: &str, source: &str, comment: Option<&str>) -> Option<TranslationStatus> {
        self.lookup(context, source, comment).map(|e| e.status)
    }

    pub fn plural_rule(&self) -> PluralRule {
        self.language
            .as_deref()
            .map(PluralRule::for_language)
            .unwrap_or_default()
    }

    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats::default();
        for entry in self.messages() {
            stats.total += 1;
            match entry.status {
                TranslationStatus::Finished => stats.finished += 1,
                TranslationStatus::Unfinished => stats.unfinished += 1,
                TranslationStatus::Vanished => stats.vanished += 1,
                TranslationStatus::Obsolete => stats.obsolete += 1,
            }
        }
        stats
    }

    /// Resolved display strings for every message, keyed by message key.
    ///
    /// Plural messages resolve to all their forms. Two catalogues with equal
    /// lookup tables display the same text for every request.
    pub fn lookup_table(&self) -> BTreeMap<MessageKey, Vec<String>> {
        self.messages()
            .map(|entry| {
                let resolved = if !entry.is_usable() {
                    vec![entry.source.clone()]
                } else if entry.numerus {
                    entry
                        .numerus_forms
                        .iter()
                        .map(|f| {
                            let text = if f.is_empty() { &entry.source } else { f };
                            text.clone()
                        })
                        .collect()
                } else {
                    vec![entry.translation.clone()]
                };
                (entry.key(), resolved)
            })
            .collect()
    }
}
