use std::path::PathBuf;
use thiserror::Error;

/// Error type for loading, writing and querying translation catalogues
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The file is not well-formed XML
    #[error("Failed to parse {file} at line {line}:\n{reason}\n\nTip: Verify the XML syntax is correct")]
    Xml {
        file: PathBuf,
        line: usize,
        reason: String,
    },

    /// Well-formed XML that does not follow the TS schema
    #[error("Invalid translation file {file} at line {line}: {reason}")]
    Schema {
        file: PathBuf,
        line: usize,
        reason: String,
    },

    /// Two messages share the same (context, source, comment) key
    #[error("Duplicate message in {file} at line {line}: context '{context}', source '{source_text}'{}\n\nTip: Add a disambiguation <comment> to one of the messages", comment_suffix(.comment))]
    DuplicateMessage {
        file: PathBuf,
        line: usize,
        context: String,
        source_text: String,
        comment: String,
    },

    /// No catalogue matches the requested locale
    #[error("No translation found for locale '{locale}' in {dir}.\n\nAvailable: {available}")]
    UnknownLocale {
        locale: String,
        dir: PathBuf,
        available: String,
    },

    /// Template and catalogue disagree on the source language
    #[error("Cannot merge: template source language '{template}' differs from catalogue source language '{catalog}'")]
    SourceLanguageMismatch { template: String, catalog: String },

    /// A search pattern that does not compile
    #[error("Invalid search pattern '{pattern}': {reason}\n\nTip: Drop --regex to search for the literal text")]
    InvalidPattern { pattern: String, reason: String },

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// IO error tied to a specific file
    #[error("Failed to read {file}: {source}")]
    FileIo {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn comment_suffix(comment: &str) -> String {
    if comment.is_empty() {
        String::new()
    } else {
        format!(", comment '{}'", comment)
    }
}

impl CatalogError {
    /// Create an Xml error from a file path, line and reason
    pub fn xml(file: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Self::Xml {
            file: file.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Create a Schema error from a file path, line and reason
    pub fn schema(file: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Self::Schema {
            file: file.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Create an UnknownLocale error listing what is available
    pub fn unknown_locale(
        locale: impl Into<String>,
        dir: impl Into<PathBuf>,
        available: &[String],
    ) -> Self {
        let available = if available.is_empty() {
            "(none)".to_string()
        } else {
            available.join(", ")
        };
        Self::UnknownLocale {
            locale: locale.into(),
            dir: dir.into(),
            available,
        }
    }

    /// Wrap an IO error with the file it came from
    pub fn file_io(file: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileIo {
            file: file.into(),
            source,
        }
    }

    /// Line the error points at, when it points at one
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Xml { line, .. }
            | Self::Schema { line, .. }
            | Self::DuplicateMessage { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Result type alias for CatalogError
pub type Result<T> = std::result::Result<T, CatalogError>;
