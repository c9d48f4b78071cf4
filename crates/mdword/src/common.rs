//! Common types for the conversion system.

use std::path::Path;

use ecow::EcoString;

use crate::Result;
use crate::ir::Document;

/// Valid formats for the conversion.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    #[default]
    Docx,
    Text,
}

impl Format {
    /// Picks the format from the extension of an output path. Anything but
    /// `.txt` is written as DOCX.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("txt") => Format::Text,
            _ => Format::Docx,
        }
    }
}

/// Format writer trait for different output formats
pub trait FormatWriter {
    /// Write the document to output format
    fn write_eco(&mut self, document: &Document, output: &mut EcoString) -> Result<()>;

    /// Write the document to vector
    fn write_vec(&mut self, document: &Document) -> Result<Vec<u8>>;
}
