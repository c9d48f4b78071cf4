//! DOCX document writer implementation

use std::io::Cursor;

use docx_rs::*;
use ecow::EcoString;
use log::debug;

use crate::Result;
use crate::common::FormatWriter;
use crate::config::{Alignment, Orientation};
use crate::ir::{self, HeaderPart, ParagraphRole, RunFormat, Unit};

use super::numbering::DocxNumbering;
use super::styles::{DocxStyles, half_points};

const TWIPS_PER_CM: f64 = 1440.0 / 2.54;
const TWIPS_PER_INCH: f64 = 1440.0;
/// Hanging indent of list entries whose indent is set explicitly.
const LIST_HANGING: i32 = 360;

/// Body content of a section, in document order.
enum Content {
    Paragraph(Paragraph),
    Table(Table),
}

/// DOCX writer that gives every section of the assembled document a page
/// section of its own.
///
/// Each section break starts a new page and carries the page setup, header
/// and footer of the section before it. The last section uses the properties
/// of the document body.
pub struct DocxWriter {
    styles: DocxStyles,
    numbering: DocxNumbering,
}

impl Default for DocxWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxWriter {
    pub fn new() -> Self {
        Self {
            styles: DocxStyles::new(),
            numbering: DocxNumbering::new(),
        }
    }

    fn twips(cm: f64) -> i32 {
        (cm * TWIPS_PER_CM).round() as i32
    }

    fn twentieths(points: f64) -> u32 {
        (points * 20.0).round().max(0.0) as u32
    }

    fn apply_run_format(mut run: Run, format: &RunFormat) -> Run {
        if let Some(font) = &format.font {
            run = run.fonts(DocxStyles::run_fonts(font));
        }
        if let Some(size) = format.size {
            run = run.size(half_points(size));
        }
        if format.bold {
            run = run.bold();
        }
        if format.italic {
            run = run.italic();
        }
        if format.underline {
            run = run.underline("single");
        }
        if let Some(color) = format.color {
            run = run.color(color.hex());
        }
        run
    }

    /// Builds a run, turning line feeds into line breaks.
    fn build_run(text: &str, format: &RunFormat) -> Run {
        let mut run = Self::apply_run_format(Run::new(), format);
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                run = run.add_break(BreakType::TextWrapping);
            }
            if !line.is_empty() {
                run = run.add_text(line);
            }
        }
        run
    }

    fn apply_paragraph_format(mut para: Paragraph, format: &ir::ParagraphFormat) -> Paragraph {
        if format.space_before.is_some()
            || format.space_after.is_some()
            || format.line_spacing.is_some()
        {
            let mut spacing = LineSpacing::new();
            if let Some(before) = format.space_before {
                spacing = spacing.before(Self::twentieths(before) as _);
            }
            if let Some(after) = format.space_after {
                spacing = spacing.after(Self::twentieths(after) as _);
            }
            if let Some(line) = format.line_spacing {
                spacing = spacing
                    .line((line * 240.0).round() as _)
                    .line_rule(LineSpacingType::Auto);
            }
            para = para.line_spacing(spacing);
        }

        if let Some(alignment) = format.alignment {
            para = para.align(match alignment {
                Alignment::Left => AlignmentType::Left,
                Alignment::Center => AlignmentType::Center,
                Alignment::Right => AlignmentType::Right,
                Alignment::Justify => AlignmentType::Both,
            });
        }

        if format.keep_with_next {
            para = para.keep_next(true);
        }
        para
    }

    fn style_of(role: ParagraphRole) -> Option<String> {
        match role {
            ParagraphRole::Heading(level) => Some(format!("Heading{}", level.clamp(1, 6))),
            ParagraphRole::Code => Some("CodeBlock".into()),
            ParagraphRole::Caption => Some("Caption".into()),
            ParagraphRole::TocHeading => Some("TOCHeading".into()),
            ParagraphRole::Body
            | ParagraphRole::ListEntry { .. }
            | ParagraphRole::CodeLabel
            | ParagraphRole::Placeholder => None,
        }
    }

    /// Builds a paragraph, defining list numbering in `docx` when needed.
    fn build_paragraph(&mut self, mut docx: Docx, source: &ir::Paragraph) -> (Docx, Paragraph) {
        let mut para = Paragraph::new();
        if let Some(style) = Self::style_of(source.role) {
            para = para.style(&style);
        }
        para = Self::apply_paragraph_format(para, &source.format);

        if let ParagraphRole::ListEntry {
            ordered,
            depth,
            instance,
        } = source.role
        {
            let (doc, num_id) = self.numbering.numbering_for(docx, instance, ordered);
            docx = doc;
            para = para.numbering(NumberingId::new(num_id), IndentLevel::new(depth.min(8)));
        }

        if let Some(indent) = source.format.left_indent {
            let special = matches!(source.role, ParagraphRole::ListEntry { .. })
                .then_some(SpecialIndentType::Hanging(LIST_HANGING));
            para = para.indent(
                Some((indent * TWIPS_PER_INCH).round() as _),
                special,
                None,
                None,
            );
        }

        for run in &source.runs {
            if let Some(target) = &run.link {
                let text = Self::build_run(&run.text, &run.format).style("Hyperlink");
                para = para.add_hyperlink(
                    Hyperlink::new(target.as_str(), HyperlinkType::External).add_run(text),
                );
            } else {
                para = para.add_run(Self::build_run(&run.text, &run.format));
            }
        }

        (docx, para)
    }

    fn process_paragraph(
        &mut self,
        docx: Docx,
        source: &ir::Paragraph,
        content: &mut Vec<Content>,
    ) -> Docx {
        let (docx, para) = self.build_paragraph(docx, source);

        // Shaded paragraphs are framed in a single cell table.
        content.push(match source.format.shading {
            Some(fill) => {
                let cell = TableCell::new()
                    .add_paragraph(para)
                    .shading(Shading::new().fill(fill.hex()));
                Content::Table(Table::new(vec![TableRow::new(vec![cell])]))
            }
            None => Content::Paragraph(para),
        });
        docx
    }

    fn process_table(table: &ir::Table) -> Option<Table> {
        if table.rows.is_empty() || table.columns == 0 {
            return None;
        }

        let mut grid = Table::new(vec![]).style("Table");
        for row in &table.rows {
            let cells = row
                .iter()
                .map(|cell| {
                    let para = Paragraph::new().add_run(Self::build_run(&cell.text, &cell.format));
                    let table_cell = TableCell::new().add_paragraph(para);
                    match cell.fill {
                        Some(fill) => table_cell.shading(Shading::new().fill(fill.hex())),
                        None => table_cell,
                    }
                })
                .collect();
            grid = grid.add_row(TableRow::new(cells));
        }

        Some(grid)
    }

    fn process_image(image: &ir::Image) -> Paragraph {
        let pic = Pic::new(&image.data).size(image.width_emu, image.height_emu);
        Paragraph::new()
            .add_run(Run::new().add_image(pic))
            .align(AlignmentType::Center)
    }

    /// Appends a complex field to a paragraph. `dirty` asks the viewer to
    /// refresh the field on open.
    fn add_field(para: Paragraph, instruction: String, cached: Run, dirty: bool) -> Paragraph {
        para.add_run(Run::new().add_field_char(FieldCharType::Begin, dirty))
            .add_run(Run::new().add_instr_text(InstrText::Unsupported(instruction)))
            .add_run(Run::new().add_field_char(FieldCharType::Separate, false))
            .add_run(cached)
            .add_run(Run::new().add_field_char(FieldCharType::End, false))
    }

    fn process_toc(field: &ir::TocField) -> Paragraph {
        let instruction = format!("TOC \\o \"1-{}\" \\h \\z \\u", field.levels);
        let cached = Self::build_run(&field.placeholder, &field.format);
        Self::add_field(Paragraph::new(), instruction, cached, true)
    }

    fn process_unit(&mut self, docx: Docx, unit: &Unit, content: &mut Vec<Content>) -> Docx {
        let item = match unit {
            Unit::Paragraph(para) => return self.process_paragraph(docx, para, content),
            Unit::Table(table) => Self::process_table(table).map(Content::Table),
            Unit::Image(image) => Some(Content::Paragraph(Self::process_image(image))),
            Unit::TableOfContents(field) => Some(Content::Paragraph(Self::process_toc(field))),
        };
        content.extend(item);
        docx
    }

    /// A header or footer line. The chapter title is static text, as every
    /// chapter has a section of its own, while the page number stays a field.
    fn header_paragraph(parts: &[HeaderPart]) -> Paragraph {
        let mut para = Paragraph::new().align(AlignmentType::Center);
        for part in parts {
            para = match part {
                HeaderPart::Text(text) | HeaderPart::ChapterTitle(text) => {
                    para.add_run(Run::new().add_text(text.as_str()))
                }
                HeaderPart::PageNumber => {
                    Self::add_field(para, "PAGE".into(), Run::new().add_text("1"), false)
                }
            };
        }
        para
    }

    fn page_margin(page: &ir::PageSetup) -> PageMargin {
        PageMargin::new()
            .top(Self::twips(page.margins.top) as _)
            .bottom(Self::twips(page.margins.bottom) as _)
            .left(Self::twips(page.margins.left) as _)
            .right(Self::twips(page.margins.right) as _)
    }

    /// Page setup of the last section, which lives in the document body.
    fn apply_page_setup(docx: Docx, page: &ir::PageSetup) -> Docx {
        let docx = docx
            .page_size(Self::twips(page.width) as _, Self::twips(page.height) as _)
            .page_margin(Self::page_margin(page));

        match page.orientation {
            Orientation::Landscape => docx.page_orient(PageOrientationType::Landscape),
            Orientation::Portrait => docx,
        }
    }

    fn apply_header_footer(mut docx: Docx, section: &ir::Section) -> Docx {
        if let Some(header) = &section.header {
            docx = docx.header(Header::new().add_paragraph(Self::header_paragraph(&header.parts)));
            if header.first_page_different {
                docx = docx.first_header(Header::new().add_paragraph(Paragraph::new()));
            }
        }
        if let Some(footer) = &section.footer {
            docx = docx.footer(Footer::new().add_paragraph(Self::header_paragraph(&footer.parts)));
            if footer.first_page_different {
                docx = docx.first_footer(Footer::new().add_paragraph(Paragraph::new()));
            }
        }
        docx
    }

    /// Builds a section ended by its own section break, carrying its page
    /// setup and header/footer.
    fn build_section(source: &ir::Section, content: Vec<Content>) -> Section {
        let page = &source.page;
        let mut size =
            PageSize::new().size(Self::twips(page.width) as _, Self::twips(page.height) as _);
        if page.orientation == Orientation::Landscape {
            size = size.orient(PageOrientationType::Landscape);
        }
        let mut section = Section::new()
            .page_size(size)
            .page_margin(Self::page_margin(page));

        if let Some(header) = &source.header {
            section =
                section.header(Header::new().add_paragraph(Self::header_paragraph(&header.parts)));
            if header.first_page_different {
                section = section.first_header(Header::new().add_paragraph(Paragraph::new()));
            }
        }
        if let Some(footer) = &source.footer {
            section =
                section.footer(Footer::new().add_paragraph(Self::header_paragraph(&footer.parts)));
            if footer.first_page_different {
                section = section.first_footer(Footer::new().add_paragraph(Paragraph::new()));
            }
        }

        for item in content {
            section = match item {
                Content::Paragraph(para) => section.add_paragraph(para),
                Content::Table(table) => section.add_table(table),
            };
        }
        section
    }

    /// Generate DOCX document
    pub fn generate_docx(&mut self, document: &ir::Document) -> Result<Vec<u8>> {
        self.numbering = DocxNumbering::new();

        let toc = document
            .sections
            .iter()
            .flat_map(|section| &section.units)
            .find_map(|unit| match unit {
                Unit::TableOfContents(field) => Some(field),
                _ => None,
            });

        let mut docx = self.styles.initialize_styles(Docx::new(), toc);
        let mut sections = document.sections.iter().peekable();
        while let Some(section) = sections.next() {
            debug!("writing section {:?}", section.title);

            let mut content = Vec::new();
            for unit in &section.units {
                docx = self.process_unit(docx, unit, &mut content);
            }

            let Some(next) = sections.peek() else {
                // The last section is closed by the document's own properties.
                docx = Self::apply_page_setup(docx, &section.page);
                docx = Self::apply_header_footer(docx, section);
                for item in content {
                    docx = match item {
                        Content::Paragraph(para) => docx.add_paragraph(para),
                        Content::Table(table) => docx.add_table(table),
                    };
                }
                break;
            };

            if next.page_break {
                content.push(Content::Paragraph(
                    Paragraph::new().add_run(Run::new().add_break(BreakType::Page)),
                ));
            }
            docx = docx.add_section(Self::build_section(section, content));
        }

        let docx_built = docx.build();
        let mut buffer = Vec::new();
        docx_built
            .pack(&mut Cursor::new(&mut buffer))
            .map_err(|e| format!("Failed to pack DOCX: {e}"))?;

        Ok(buffer)
    }
}

impl FormatWriter for DocxWriter {
    fn write_vec(&mut self, document: &ir::Document) -> Result<Vec<u8>> {
        self.generate_docx(document)
    }

    fn write_eco(&mut self, _document: &ir::Document, _output: &mut EcoString) -> Result<()> {
        Err("DOCX format does not support EcoString output".into())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::assemble::assemble;
    use crate::chapter::Chapter;
    use crate::config::Config;
    use crate::fetch::OfflineFetcher;

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|window| window == needle.as_bytes())
    }

    fn body(role: ParagraphRole) -> ir::Paragraph {
        ir::Paragraph::new(role, ir::ParagraphFormat::default())
    }

    #[test]
    fn line_feeds_become_breaks() {
        let run = DocxWriter::build_run("a\nb", &RunFormat::default());
        assert_eq!(run.children.len(), 3);
        assert!(matches!(run.children[1], RunChild::Break(_)));
    }

    #[test]
    fn links_become_hyperlinks() {
        let mut link = ir::TextRun::new("site", RunFormat::default());
        link.link = Some("https://example.com".into());
        let source = body(ParagraphRole::Body)
            .with_run(ir::TextRun::new("see ", RunFormat::default()))
            .with_run(link);

        let (_, para) = DocxWriter::new().build_paragraph(Docx::new(), &source);
        assert_eq!(para.children.len(), 2);
        assert!(matches!(para.children[1], ParagraphChild::Hyperlink(_)));
    }

    #[test]
    fn list_entries_are_numbered() {
        let source = body(ParagraphRole::ListEntry {
            ordered: true,
            depth: 1,
            instance: 7,
        })
        .with_run(ir::TextRun::new("item", RunFormat::default()));

        let (_, para) = DocxWriter::new().build_paragraph(Docx::new(), &source);
        assert!(para.property.numbering_property.is_some());
    }

    #[test]
    fn packs_a_document() {
        let config = Config::default();
        let chapters = [
            Chapter::parse(
                Path::new("a.md"),
                "# Alpha\n\nSome **bold** text.\n\n- one\n  - two\n\n| A | B |\n|---|---|\n| 1 | 2 |\n\n```rust\nfn main() {}\n```\n\n![missing](nowhere.png)\n",
            ),
            Chapter::parse(Path::new("b.md"), "# Beta\n\n1. first\n2. second\n"),
        ];
        let document = assemble(&config, &chapters, &mut OfflineFetcher);

        let bytes = DocxWriter::new().write_vec(&document).unwrap();
        assert!(bytes.starts_with(b"PK"));
        assert!(contains(&bytes, "word/document.xml"));
        assert!(contains(&bytes, "word/header"));
    }

    #[test]
    fn chapter_titles_are_written_as_text() {
        let title = DocxWriter::header_paragraph(&[
            HeaderPart::Text("Book: ".into()),
            HeaderPart::ChapterTitle("Beta".into()),
        ]);
        assert_eq!(title.children.len(), 2);
        assert!(title.children.iter().all(|child| matches!(child, ParagraphChild::Run(run)
            if run.children.iter().all(|c| matches!(c, RunChild::Text(_))))));

        // begin, instruction, separate, cached value, end
        let page = DocxWriter::header_paragraph(&[HeaderPart::PageNumber]);
        assert_eq!(page.children.len(), 5);
    }

    #[test]
    fn each_chapter_gets_its_own_header() {
        let config = Config::from_overrides(serde_json::json!({
            "document": {
                "generate_toc": false,
                "page_break_between_files": false,
                "header": { "first_page_different": false },
                "footer": { "enabled": false }
            }
        }))
        .unwrap();
        let write = |names: &[&str]| {
            let chapters: Vec<_> = names
                .iter()
                .map(|name| Chapter::parse(Path::new(name), &format!("# {name}\n\ntext")))
                .collect();
            let document = assemble(&config, &chapters, &mut OfflineFetcher);
            DocxWriter::new().write_vec(&document).unwrap()
        };
        let parts = |bytes: &[u8]| {
            bytes
                .windows("word/header".len())
                .filter(|window| *window == b"word/header")
                .count()
        };

        let one = write(&["a.md"]);
        let three = write(&["a.md", "b.md", "c.md"]);
        assert!(parts(&one) > 0);
        assert!(parts(&three) > parts(&one));
    }

    #[test]
    fn rejects_text_output() {
        let mut output = EcoString::new();
        let result = DocxWriter::new().write_eco(&ir::Document::default(), &mut output);
        assert!(result.is_err());
    }
}
