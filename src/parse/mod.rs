pub mod translation;
pub mod ts_parser;

pub use translation::{Location, MessageKey, TranslationEntry, TranslationStatus};
pub use ts_parser::{TsParser, LENGTH_VARIANT_SEPARATOR};
