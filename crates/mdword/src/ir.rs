//! The assembled document model.
//!
//! Every unit carries its resolved formatting, so writers never consult the
//! configuration again. The model is independent from the DOCX format and is
//! also dumped as text for inspection.

use ecow::EcoString;

use crate::config::{Alignment, Margins, Orientation, Rgb, StyleProfile};

/// An assembled document: an optional table of contents followed by one
/// section per chapter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub sections: Vec<Section>,
}

impl Document {
    /// The chapter sections, in input order.
    pub fn chapters(&self) -> impl Iterator<Item = &Section> {
        self.sections
            .iter()
            .filter(|section| section.kind == SectionKind::Chapter)
    }

    /// The table of contents section, if any.
    pub fn toc(&self) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.kind == SectionKind::TableOfContents)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    TableOfContents,
    Chapter,
}

/// A page section.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    /// The title substituted for `{chapter}`.
    pub title: EcoString,
    /// The originating file of a chapter.
    pub file_name: Option<EcoString>,
    pub page: PageSetup,
    pub header: Option<HeaderFooter>,
    pub footer: Option<HeaderFooter>,
    /// Whether the section starts on a new page.
    pub new_page: bool,
    /// Whether an extra page break precedes the section.
    pub page_break: bool,
    pub units: Vec<Unit>,
}

/// Page geometry in centimeters, with the orientation already applied to the
/// size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
    pub orientation: Orientation,
}

/// A header or footer line.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderFooter {
    pub parts: Vec<HeaderPart>,
    /// Leaves the first page of the section without this header or footer.
    pub first_page_different: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderPart {
    Text(EcoString),
    /// The title of the chapter the page belongs to.
    ChapterTitle(EcoString),
    /// A live page number field.
    PageNumber,
}

/// A styled output unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Unit {
    Paragraph(Paragraph),
    Table(Table),
    Image(Image),
    TableOfContents(TocField),
}

/// What a paragraph stands for. Writers map roles to named styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphRole {
    Body,
    Heading(u8),
    ListEntry {
        ordered: bool,
        depth: usize,
        /// Entries sharing an instance are numbered together.
        instance: usize,
    },
    CodeLabel,
    Code,
    Caption,
    /// Text standing in for an element that could not be rendered.
    Placeholder,
    TocHeading,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub role: ParagraphRole,
    pub format: ParagraphFormat,
    pub runs: Vec<TextRun>,
}

impl Paragraph {
    pub fn new(role: ParagraphRole, format: ParagraphFormat) -> Self {
        Self {
            role,
            format,
            runs: Vec::new(),
        }
    }

    pub fn with_run(mut self, run: TextRun) -> Self {
        self.runs.push(run);
        self
    }

    /// The concatenated text of the runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// Paragraph-level formatting. Lengths are in points, the indent in inches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphFormat {
    pub space_before: Option<f64>,
    pub space_after: Option<f64>,
    pub line_spacing: Option<f64>,
    pub left_indent: Option<f64>,
    pub alignment: Option<Alignment>,
    pub keep_with_next: bool,
    /// Fill of the frame around the paragraph.
    pub shading: Option<Rgb>,
}

impl ParagraphFormat {
    pub fn from_profile(profile: &StyleProfile) -> Self {
        Self {
            space_before: profile.space_before,
            space_after: profile.space_after,
            line_spacing: profile.line_spacing,
            left_indent: profile.left_indent,
            alignment: profile.alignment,
            keep_with_next: profile.keep_with_next.unwrap_or(false),
            shading: None,
        }
    }
}

/// A run of uniformly formatted text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: EcoString,
    pub format: RunFormat,
    /// The target of a hyperlink.
    pub link: Option<EcoString>,
}

impl TextRun {
    pub fn new(text: impl Into<EcoString>, format: RunFormat) -> Self {
        Self {
            text: text.into(),
            format,
            link: None,
        }
    }
}

/// Character-level formatting. The size is in points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunFormat {
    pub font: Option<EcoString>,
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Option<Rgb>,
}

impl RunFormat {
    pub fn from_profile(profile: &StyleProfile) -> Self {
        Self::default().overlay(profile)
    }

    /// Applies the attributes a profile sets, keeping the others.
    pub fn overlay(mut self, profile: &StyleProfile) -> Self {
        if let Some(font) = &profile.font_name {
            self.font = Some(font.as_str().into());
        }
        if let Some(size) = profile.font_size {
            self.size = Some(size);
        }
        if let Some(bold) = profile.bold {
            self.bold = bold;
        }
        if let Some(italic) = profile.italic {
            self.italic = italic;
        }
        if let Some(color) = profile.color {
            self.color = Some(color);
        }
        self
    }
}

/// A table grid. Every row has exactly `columns` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: usize,
    pub rows: Vec<Vec<TableCell>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub text: EcoString,
    pub header: bool,
    pub format: RunFormat,
    pub fill: Option<Rgb>,
}

/// An embedded picture, centered on its own line.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// PNG or JPEG data.
    pub data: Vec<u8>,
    pub width_emu: u32,
    pub height_emu: u32,
    pub source: EcoString,
}

/// A table of contents field, populated when the viewer refreshes fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TocField {
    /// The deepest heading level listed.
    pub levels: u8,
    /// Text shown until the field is refreshed.
    pub placeholder: EcoString,
    pub format: RunFormat,
}
