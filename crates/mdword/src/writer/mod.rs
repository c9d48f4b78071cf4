//! Writer implementations for different output formats

pub mod docx;
pub mod text;

pub use self::docx::DocxWriter;
pub use text::TextWriter;

use crate::common::{Format, FormatWriter};

/// Create a writer instance based on the specified format
pub fn create_writer(format: Format) -> Box<dyn FormatWriter> {
    match format {
        Format::Docx => Box::new(DocxWriter::new()),
        Format::Text => Box::new(TextWriter::new()),
    }
}
