//! DOCX writer implementation using docx-rs
//!
//! - Writer: lays the assembled document out as DOCX
//! - Styles: named styles for headings, captions and the table of contents
//! - Numbering: list numbering definitions

mod numbering;
mod styles;
mod writer;

pub use writer::DocxWriter;
