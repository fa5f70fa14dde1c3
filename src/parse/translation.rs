use serde::{Deserialize, Serialize};
use std::fmt;

/// Translation state carried by the `type` attribute of `<translation>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStatus {
    /// No `type` attribute: the translation is done
    #[default]
    Finished,
    Unfinished,
    /// The source string disappeared from the code but the translation is kept
    Vanished,
    Obsolete,
}

impl TranslationStatus {
    /// Parse the value of a `type` attribute
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "unfinished" => Some(Self::Unfinished),
            "vanished" => Some(Self::Vanished),
            "obsolete" => Some(Self::Obsolete),
            _ => None,
        }
    }

    /// Value written to the `type` attribute, `None` for finished translations
    pub fn as_attr(self) -> Option<&'static str> {
        match self {
            Self::Finished => None,
            Self::Unfinished => Some("unfinished"),
            Self::Vanished => Some("vanished"),
            Self::Obsolete => Some("obsolete"),
        }
    }

    /// Vanished and obsolete messages are kept for translators only
    pub fn is_retired(self) -> bool {
        matches!(self, Self::Vanished | Self::Obsolete)
    }
}

impl fmt::Display for TranslationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_attr().unwrap_or("finished"))
    }
}

/// Where a message was extracted from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: Option<u32>,
}

/// Key identifying a message inside a catalogue.
///
/// An absent disambiguation comment is stored as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageKey {
    pub context: String,
    pub source: String,
    pub comment: String,
}

impl MessageKey {
    pub fn new(context: &str, source: &str, comment: Option<&str>) -> Self {
        Self {
            context: context.to_string(),
            source: source.to_string(),
            comment: comment.unwrap_or_default().to_string(),
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.comment.is_empty() {
            write!(f, "{}::{}", self.context, self.source)
        } else {
            write!(f, "{}::{} ({})", self.context, self.source, self.comment)
        }
    }
}

/// A single `<message>` of a translation catalogue
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TranslationEntry {
    /// Name of the UI component the string belongs to (e.g., "GMainWindow")
    pub context: String,
    /// Untranslated display text, placeholders and markup kept verbatim
    pub source: String,
    /// Disambiguation comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Translated text; empty when nothing has been entered yet
    pub translation: String,
    /// Plural forms, only used when `numerus` is set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub numerus_forms: Vec<String>,
    #[serde(default)]
    pub numerus: bool,
    pub status: TranslationStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_comment: Option<String>,
    /// Note from the developer to translators
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translator_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    /// `extra-*` elements as (name without prefix, value)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<(String, String)>,
    /// Line of the `<message>` element (1-indexed, 0 when not loaded from a file)
    #[serde(default)]
    pub line: usize,
}

impl TranslationEntry {
    /// Create an unfinished entry with no translation
    pub fn new(context: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
            status: TranslationStatus::Unfinished,
            ..Default::default()
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Set a translation and mark the entry finished
    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = translation.into();
        self.status = TranslationStatus::Finished;
        self
    }

    /// Set plural forms and mark the entry finished
    pub fn with_numerus_forms(mut self, forms: Vec<String>) -> Self {
        self.numerus = true;
        self.numerus_forms = forms;
        self.status = TranslationStatus::Finished;
        self
    }

    pub fn with_status(mut self, status: TranslationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_location(mut self, file: impl Into<String>, line: Option<u32>) -> Self {
        self.locations.push(Location {
            file: file.into(),
            line,
        });
        self
    }

    pub fn key(&self) -> MessageKey {
        MessageKey::new(&self.context, &self.source, self.comment.as_deref())
    }

    /// Disambiguation comment, empty when absent
    pub fn comment_str(&self) -> &str {
        self.comment.as_deref().unwrap_or_default()
    }

    /// True when the UI should display the translation rather than the source
    pub fn is_usable(&self) -> bool {
        if self.status != TranslationStatus::Finished {
            return false;
        }
        if self.numerus {
            self.numerus_forms.iter().any(|f| !f.is_empty())
        } else {
            !self.translation.is_empty()
        }
    }

    /// True when a translator has entered any text at all
    pub fn has_text(&self) -> bool {
        !self.translation.is_empty() || self.numerus_forms.iter().any(|f| !f.is_empty())
    }

    /// All translated texts: the numerus forms or the single translation
    pub fn texts(&self) -> Vec<&str> {
        if self.numerus {
            self.numerus_forms.iter().map(String::as_str).collect()
        } else {
            vec![self.translation.as_str()]
        }
    }
}
