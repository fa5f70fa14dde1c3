pub mod formatter;
pub mod simple_formatter;
pub mod ts_writer;

pub use formatter::ReportFormatter;
pub use simple_formatter::SimpleFormatter;
pub use ts_writer::TsWriter;
