pub mod catalog_search;
pub mod text_match;

pub use catalog_search::{CatalogScanner, MatchField, ScanOutcome, SearchHit, SkippedFile};
pub use text_match::TextMatcher;
