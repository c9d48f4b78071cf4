//! Named document styles.
//!
//! Units carry their formatting directly. Named styles exist so that the
//! table of contents finds the headings.

use docx_rs::*;

use crate::ir::{RunFormat, TocField};

/// Document style management
#[derive(Clone, Debug, Default)]
pub struct DocxStyles;

impl DocxStyles {
    pub fn new() -> Self {
        Self
    }

    /// Builds fonts setting every script to the same family.
    pub fn run_fonts(family: &str) -> RunFonts {
        RunFonts::new()
            .ascii(family)
            .hi_ansi(family)
            .east_asia(family)
            .cs(family)
    }

    fn create_heading_style(name: &str, display_name: &str, size: usize) -> Style {
        Style::new(name, StyleType::Paragraph)
            .name(display_name)
            .size(size)
            .bold()
    }

    /// A table of contents entry style, `toc 1` to `toc 9`.
    fn create_toc_style(level: usize, format: Option<&RunFormat>) -> Style {
        let mut style = Style::new(format!("TOC{level}"), StyleType::Paragraph)
            .name(format!("toc {level}"))
            .indent(Some(240 * (level as i32 - 1)), None, None, None);

        if let Some(format) = format {
            if let Some(font) = &format.font {
                style = style.fonts(Self::run_fonts(font));
            }
            if let Some(size) = format.size {
                style = style.size(half_points(size));
            }
            if let Some(color) = format.color {
                style = style.color(color.hex());
            }
        }
        style
    }

    /// Adds the named styles to a document.
    pub fn initialize_styles(&self, docx: Docx, toc: Option<&TocField>) -> Docx {
        let mut docx = docx
            .add_style(Self::create_heading_style("Heading1", "Heading 1", 32))
            .add_style(Self::create_heading_style("Heading2", "Heading 2", 28))
            .add_style(Self::create_heading_style("Heading3", "Heading 3", 26))
            .add_style(Self::create_heading_style("Heading4", "Heading 4", 24))
            .add_style(Self::create_heading_style("Heading5", "Heading 5", 22))
            .add_style(Self::create_heading_style("Heading6", "Heading 6", 20));

        let code_block = Style::new("CodeBlock", StyleType::Paragraph)
            .name("Code Block")
            .fonts(Self::run_fonts("Courier New"))
            .size(18);

        let caption = Style::new("Caption", StyleType::Paragraph)
            .name("Caption")
            .italic()
            .size(16)
            .align(AlignmentType::Center);

        let hyperlink = Style::new("Hyperlink", StyleType::Character)
            .name("Hyperlink")
            .color("0000FF")
            .underline("single");

        let toc_heading = Style::new("TOCHeading", StyleType::Paragraph)
            .name("TOC Heading")
            .bold();

        let table = Style::new("Table", StyleType::Table)
            .name("Table")
            .table_align(TableAlignmentType::Center);

        docx = docx
            .add_style(code_block)
            .add_style(caption)
            .add_style(hyperlink)
            .add_style(toc_heading)
            .add_style(table);

        if let Some(field) = toc {
            for level in 1..=usize::from(field.levels) {
                docx = docx.add_style(Self::create_toc_style(level, Some(&field.format)));
            }
        }

        docx
    }
}

/// Converts a size in points to half-points.
pub fn half_points(size: f64) -> usize {
    (size * 2.0).round().max(0.0) as usize
}
