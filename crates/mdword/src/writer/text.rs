//! Text writer implementation - dumps the assembled document as plain text

use std::collections::HashMap;
use std::fmt::Write;

use ecow::EcoString;

use crate::Result;
use crate::common::FormatWriter;
use crate::ir::{
    Document, HeaderFooter, HeaderPart, Paragraph, ParagraphRole, Section, SectionKind, Table,
    TextRun, Unit,
};

/// Text writer implementation
#[derive(Default)]
pub struct TextWriter {
    /// The last number used by each ordered list instance.
    numbers: HashMap<usize, usize>,
}

impl TextWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_document(&mut self, document: &Document, output: &mut EcoString) -> Result<()> {
        self.numbers.clear();
        for (index, section) in document.sections.iter().enumerate() {
            if index > 0 {
                output.push('\n');
            }
            self.write_section(section, output)?;
        }
        Ok(())
    }

    fn write_section(&mut self, section: &Section, output: &mut EcoString) -> Result<()> {
        match (section.kind, &section.file_name) {
            (SectionKind::Chapter, Some(file)) => {
                write!(output, "=== chapter \"{}\" from {file}", section.title)?
            }
            (SectionKind::Chapter, None) => write!(output, "=== chapter \"{}\"", section.title)?,
            (SectionKind::TableOfContents, _) => {
                write!(output, "=== contents \"{}\"", section.title)?
            }
        }
        if section.new_page {
            output.push_str(", new page");
        }
        if section.page_break {
            output.push_str(", after a page break");
        }
        output.push('\n');

        Self::write_header_footer("header", section.header.as_ref(), output)?;
        Self::write_header_footer("footer", section.footer.as_ref(), output)?;
        output.push('\n');

        for unit in &section.units {
            self.write_unit(unit, output)?;
        }
        Ok(())
    }

    fn write_header_footer(
        label: &str,
        header: Option<&HeaderFooter>,
        output: &mut EcoString,
    ) -> Result<()> {
        let Some(header) = header else {
            return Ok(());
        };

        write!(output, "{label}: ")?;
        for part in &header.parts {
            match part {
                HeaderPart::Text(text) | HeaderPart::ChapterTitle(text) => output.push_str(text),
                HeaderPart::PageNumber => output.push('#'),
            }
        }
        if header.first_page_different {
            output.push_str(" (not on the first page)");
        }
        output.push('\n');
        Ok(())
    }

    fn write_unit(&mut self, unit: &Unit, output: &mut EcoString) -> Result<()> {
        match unit {
            Unit::Paragraph(para) => self.write_paragraph(para, output)?,
            Unit::Table(table) => Self::write_table(table, output),
            Unit::Image(image) => writeln!(
                output,
                "[image {} ({}x{} EMU)]",
                image.source, image.width_emu, image.height_emu
            )?,
            Unit::TableOfContents(field) => {
                writeln!(output, "[table of contents, levels 1-{}]", field.levels)?
            }
        }
        Ok(())
    }

    fn write_paragraph(&mut self, para: &Paragraph, output: &mut EcoString) -> Result<()> {
        match para.role {
            ParagraphRole::Heading(level) => {
                for _ in 0..level {
                    output.push('#');
                }
                output.push(' ');
            }
            ParagraphRole::ListEntry {
                ordered,
                depth,
                instance,
            } => {
                for _ in 0..depth {
                    output.push_str("  ");
                }
                if ordered {
                    let number = self.numbers.entry(instance).or_default();
                    *number += 1;
                    write!(output, "{number}. ")?;
                } else {
                    output.push_str("- ");
                }
            }
            ParagraphRole::Code => {
                output.push_str("```\n");
                output.push_str(&para.text());
                output.push_str("\n```\n");
                return Ok(());
            }
            ParagraphRole::Body
            | ParagraphRole::CodeLabel
            | ParagraphRole::Caption
            | ParagraphRole::Placeholder
            | ParagraphRole::TocHeading => {}
        }

        let emphasis = matches!(
            para.role,
            ParagraphRole::Body | ParagraphRole::ListEntry { .. }
        );
        for run in &para.runs {
            Self::write_run(run, emphasis, output)?;
        }
        output.push('\n');
        Ok(())
    }

    /// Writes a run, marking bold and italic text only if `emphasis` is set.
    fn write_run(run: &TextRun, emphasis: bool, output: &mut EcoString) -> Result<()> {
        if let Some(target) = &run.link {
            write!(output, "[{}]({target})", run.text)?;
            return Ok(());
        }

        let marker = match (emphasis && run.format.bold, emphasis && run.format.italic) {
            (true, true) => "***",
            (true, false) => "**",
            (false, true) => "*",
            (false, false) => "",
        };
        write!(output, "{marker}{}{marker}", run.text)?;
        Ok(())
    }

    fn write_table(table: &Table, output: &mut EcoString) {
        for (index, row) in table.rows.iter().enumerate() {
            output.push('|');
            for cell in row {
                output.push(' ');
                output.push_str(&cell.text);
                output.push_str(" |");
            }
            output.push('\n');

            if index == 0 && row.iter().any(|cell| cell.header) {
                output.push('|');
                for _ in 0..table.columns {
                    output.push_str("---|");
                }
                output.push('\n');
            }
        }
    }
}

impl FormatWriter for TextWriter {
    fn write_eco(&mut self, document: &Document, output: &mut EcoString) -> Result<()> {
        self.write_document(document, output)
    }

    fn write_vec(&mut self, document: &Document) -> Result<Vec<u8>> {
        let mut output = EcoString::new();
        self.write_document(document, &mut output)?;
        Ok(output.as_str().as_bytes().to_vec())
    }
}
