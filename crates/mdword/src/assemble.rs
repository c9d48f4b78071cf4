//! Document assembly: sections, page setup, headers and footers, and the
//! table of contents.

use ecow::EcoString;
use log::info;

use crate::chapter::Chapter;
use crate::config::{Config, HeaderFooterSettings, StyleRole};
use crate::fetch::ImageFetcher;
use crate::ir::{
    Document, HeaderFooter, HeaderPart, PageSetup, Paragraph, ParagraphFormat, ParagraphRole,
    RunFormat, Section, SectionKind, TextRun, TocField, Unit,
};
use crate::render::BlockRenderer;

const CHAPTER_TOKEN: &str = "{chapter}";
const PAGE_TOKEN: &str = "{page}";

/// Text shown in the table of contents until the viewer refreshes fields.
pub const TOC_PLACEHOLDER: &str =
    "Right-click and choose \"Update Field\" to build the table of contents.";

/// Assembles chapters into a document.
pub fn assemble(config: &Config, chapters: &[Chapter], fetcher: &mut dyn ImageFetcher) -> Document {
    let settings = &config.document;
    let page = page_setup(config);
    let mut sections = Vec::with_capacity(chapters.len() + 1);

    if settings.generate_toc {
        sections.push(toc_section(config, page));
        info!("table of contents added");
    }

    let mut renderer = BlockRenderer::new(config, fetcher);
    for (index, chapter) in chapters.iter().enumerate() {
        let title = chapter.title_or(&settings.default_chapter_title);
        info!("processing {} (chapter: {title})", chapter.file_name);

        let mut units = Vec::new();
        if settings.add_file_headers {
            units.push(renderer.heading(1, &settings.file_header(&chapter.file_name)));
        }
        units.extend(renderer.render_blocks(&chapter.blocks, &chapter.base_dir));

        // Every chapter owns a section, and only the first one may share the
        // first page of the document.
        let new_page = index > 0 || settings.generate_toc;
        let page_break = index > 0 && settings.page_break_between_files;

        sections.push(Section {
            kind: SectionKind::Chapter,
            title: title.into(),
            file_name: Some(chapter.file_name.clone()),
            page,
            header: header_footer(&settings.header, title),
            footer: header_footer(&settings.footer, title),
            new_page,
            page_break,
            units,
        });
    }

    info!("assembled {} chapters", chapters.len());
    Document { sections }
}

fn page_setup(config: &Config) -> PageSetup {
    let settings = &config.document;
    let (width, height) = settings.oriented_page_size();
    PageSetup {
        width,
        height,
        margins: settings.margins,
        orientation: settings.orientation,
    }
}

fn toc_section(config: &Config, page: PageSetup) -> Section {
    let settings = &config.document;
    let heading_profile = config.styles.get(StyleRole::TocHeading);
    let heading = Paragraph::new(
        ParagraphRole::TocHeading,
        ParagraphFormat::from_profile(heading_profile),
    )
    .with_run(TextRun::new(
        settings.toc_title.as_str(),
        RunFormat::from_profile(heading_profile),
    ));

    let field = TocField {
        levels: settings.toc_levels.clamp(1, 9),
        placeholder: TOC_PLACEHOLDER.into(),
        format: RunFormat::from_profile(config.styles.get(StyleRole::TocItem)),
    };

    Section {
        kind: SectionKind::TableOfContents,
        title: settings.toc_title.as_str().into(),
        file_name: None,
        page,
        header: header_footer(&settings.header, &settings.toc_title),
        footer: header_footer(&settings.footer, &settings.toc_title),
        new_page: false,
        page_break: false,
        units: vec![Unit::Paragraph(heading), Unit::TableOfContents(field)],
    }
}

/// Instantiates a header or footer template for a section.
fn header_footer(settings: &HeaderFooterSettings, title: &str) -> Option<HeaderFooter> {
    settings.enabled.then(|| HeaderFooter {
        parts: parse_template(&settings.content, title),
        first_page_different: settings.first_page_different,
    })
}

/// Splits a template on its `{chapter}` and `{page}` placeholders.
pub fn parse_template(template: &str, title: &str) -> Vec<HeaderPart> {
    let mut parts = Vec::new();
    let mut rest = template;

    loop {
        let next = [CHAPTER_TOKEN, PAGE_TOKEN]
            .into_iter()
            .filter_map(|token| rest.find(token).map(|at| (at, token)))
            .min_by_key(|(at, _)| *at);

        let Some((at, token)) = next else {
            break;
        };

        if at > 0 {
            parts.push(HeaderPart::Text(rest[..at].into()));
        }
        parts.push(if token == PAGE_TOKEN {
            HeaderPart::PageNumber
        } else {
            HeaderPart::ChapterTitle(EcoString::from(title))
        });
        rest = &rest[at + token.len()..];
    }

    if !rest.is_empty() {
        parts.push(HeaderPart::Text(rest.into()));
    }
    parts
}
