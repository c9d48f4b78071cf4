//! Block rendering: maps classified blocks onto styled output units.
//!
//! Rendering never fails. Elements that cannot be rendered, such as missing
//! images, are replaced by a placeholder paragraph and reported as warnings.

pub mod image;

use std::path::Path;

use ecow::{EcoString, eco_format};
use log::debug;

use crate::config::{Config, StyleProfile, StyleRole};
use crate::fetch::ImageFetcher;
use crate::ir::{
    Paragraph, ParagraphFormat, ParagraphRole, RunFormat, Table, TableCell, TextRun, Unit,
};
use crate::parser::{Block, InlineSpan, ListItem, ListKind, SpanKind};

/// Renders blocks against a configuration.
///
/// One renderer is used for a whole document so that list numbering instances
/// stay unique across chapters.
pub struct BlockRenderer<'a> {
    config: &'a Config,
    fetcher: &'a mut dyn ImageFetcher,
    list_instances: usize,
}

impl<'a> BlockRenderer<'a> {
    pub fn new(config: &'a Config, fetcher: &'a mut dyn ImageFetcher) -> Self {
        Self {
            config,
            fetcher,
            list_instances: 0,
        }
    }

    /// Renders a sequence of blocks. Relative image paths are resolved
    /// against `base_dir`.
    pub fn render_blocks(&mut self, blocks: &[Block], base_dir: &Path) -> Vec<Unit> {
        let mut out = Vec::new();
        for block in blocks {
            self.render(block, base_dir, &mut out);
        }
        out
    }

    /// Renders a single block, appending its units to `out`.
    pub fn render(&mut self, block: &Block, base_dir: &Path, out: &mut Vec<Unit>) {
        match block {
            Block::Heading { level, text } => out.push(self.heading(*level, text)),
            Block::List(items) => self.render_list(items, 0, out),
            Block::Table { rows, has_header } => self.render_table(rows, *has_header, out),
            Block::CodeBlock { language, lines } => self.render_code(language, lines, out),
            Block::Image { alt, source } => self.render_image(alt, source, base_dir, out),
            Block::Blank => out.push(self.blank()),
            Block::Paragraph(spans) => {
                let normal = self.style(StyleRole::Normal);
                let para = Paragraph {
                    role: ParagraphRole::Body,
                    format: ParagraphFormat::from_profile(normal),
                    runs: self.span_runs(spans, normal),
                };
                out.push(Unit::Paragraph(para));
            }
        }
    }

    /// A heading paragraph styled with the profile of its level.
    pub fn heading(&self, level: u8, text: &str) -> Unit {
        let profile = self.config.styles.heading(level);
        let format = profile.map(ParagraphFormat::from_profile).unwrap_or_default();
        let run_format = profile.map(RunFormat::from_profile).unwrap_or_default();

        let para = Paragraph::new(ParagraphRole::Heading(level), format)
            .with_run(TextRun::new(text, run_format));
        Unit::Paragraph(para)
    }

    fn style(&self, role: StyleRole) -> &'a StyleProfile {
        self.config.styles.get(role)
    }

    fn blank(&self) -> Unit {
        let normal = self.style(StyleRole::Normal);
        Unit::Paragraph(Paragraph::new(
            ParagraphRole::Body,
            ParagraphFormat::from_profile(normal),
        ))
    }

    fn next_list_instance(&mut self) -> usize {
        self.list_instances += 1;
        self.list_instances
    }

    /// Renders sibling items at `depth`, then their children one level deeper.
    /// A run of same-kind siblings shares one numbering instance.
    fn render_list(&mut self, items: &[ListItem], depth: usize, out: &mut Vec<Unit>) {
        let base = self.style(StyleRole::ListItem);
        let indent_step = base.left_indent.unwrap_or(0.5);

        let mut current: Option<(ListKind, usize)> = None;
        for item in items {
            let instance = match current {
                Some((kind, instance)) if kind == item.kind => instance,
                _ => {
                    let instance = self.next_list_instance();
                    current = Some((item.kind, instance));
                    instance
                }
            };

            let mut format = ParagraphFormat::from_profile(base);
            format.left_indent = Some((depth + 1) as f64 * indent_step);
            format.space_after = Some(0.0);

            let role = ParagraphRole::ListEntry {
                ordered: item.kind == ListKind::Ordered,
                depth,
                instance,
            };
            out.push(Unit::Paragraph(Paragraph {
                role,
                format,
                runs: self.span_runs(&item.spans, base),
            }));

            self.render_list(&item.children, depth + 1, out);
        }
    }

    /// Renders inline spans over a base profile.
    fn span_runs(&self, spans: &[InlineSpan], base: &StyleProfile) -> Vec<TextRun> {
        let base_format = RunFormat::from_profile(base);
        spans
            .iter()
            .map(|span| {
                let mut format = base_format.clone();
                let mut link = None;
                match span.kind {
                    SpanKind::Plain => {}
                    SpanKind::Bold => format.bold = true,
                    SpanKind::Italic => format.italic = true,
                    SpanKind::Code => format = format.overlay(self.style(StyleRole::Code)),
                    SpanKind::Link => {
                        format.underline = true;
                        link = span.target.clone();
                    }
                }
                TextRun {
                    text: span.text.clone(),
                    format,
                    link,
                }
            })
            .collect()
    }

    fn render_table(&self, rows: &[Vec<EcoString>], has_header: bool, out: &mut Vec<Unit>) {
        let Some(first) = rows.first() else {
            return;
        };
        let columns = first.len();
        let profile = self.style(StyleRole::Table);
        let cell_format = RunFormat::from_profile(profile);

        let rows = rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                if row.len() > columns {
                    debug!("dropping {} extra table cells", row.len() - columns);
                }
                let header = has_header && index == 0;
                (0..columns)
                    .map(|column| {
                        let mut format = cell_format.clone();
                        format.bold |= header;
                        TableCell {
                            text: row.get(column).cloned().unwrap_or_default(),
                            header,
                            format,
                            fill: header.then_some(profile.header_bg_color).flatten(),
                        }
                    })
                    .collect()
            })
            .collect();

        out.push(Unit::Table(Table { columns, rows }));
        out.push(self.blank());
    }

    fn render_code(&self, language: &str, lines: &[EcoString], out: &mut Vec<Unit>) {
        if !language.is_empty() {
            let mut format = RunFormat::from_profile(self.style(StyleRole::Normal));
            format.bold = true;
            let label = Paragraph::new(ParagraphRole::CodeLabel, ParagraphFormat::default())
                .with_run(TextRun::new(eco_format!("Code ({language}):"), format));
            out.push(Unit::Paragraph(label));
        }

        let profile = self.style(StyleRole::CodeBlock);
        let mut format = ParagraphFormat::from_profile(profile);
        format.shading = profile.background;

        let text = lines.join("\n");
        let code = Paragraph::new(ParagraphRole::Code, format)
            .with_run(TextRun::new(text, RunFormat::from_profile(profile)));
        out.push(Unit::Paragraph(code));
        out.push(self.blank());
    }

    fn render_image(&mut self, alt: &str, source: &str, base_dir: &Path, out: &mut Vec<Unit>) {
        let max_width = self.config.document.image_max_width;
        match image::resolve(source, base_dir, max_width, &mut *self.fetcher) {
            Ok(img) => {
                out.push(Unit::Image(img));
                if !alt.is_empty() {
                    out.push(self.caption(alt));
                }
            }
            Err(placeholder) => {
                let normal = self.style(StyleRole::Normal);
                let para = Paragraph::new(
                    ParagraphRole::Placeholder,
                    ParagraphFormat::from_profile(normal),
                )
                .with_run(TextRun::new(placeholder, RunFormat::from_profile(normal)));
                out.push(Unit::Paragraph(para));
            }
        }
    }

    fn caption(&self, alt: &str) -> Unit {
        let profile = self.style(StyleRole::Caption);
        let para = Paragraph::new(ParagraphRole::Caption, ParagraphFormat::from_profile(profile))
            .with_run(TextRun::new(
                eco_format!("Figure: {alt}"),
                RunFormat::from_profile(profile),
            ));
        Unit::Paragraph(para)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rgb;
    use crate::fetch::OfflineFetcher;
    use crate::parser::parse_blocks;

    fn render(config: &Config, text: &str) -> Vec<Unit> {
        let mut fetcher = OfflineFetcher;
        let mut renderer = BlockRenderer::new(config, &mut fetcher);
        renderer.render_blocks(&parse_blocks(text), Path::new("."))
    }

    fn paragraphs(units: &[Unit]) -> Vec<&Paragraph> {
        units
            .iter()
            .filter_map(|unit| match unit {
                Unit::Paragraph(para) => Some(para),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn heading_uses_level_profile() {
        let config = Config::default();
        let units = render(&config, "# Title\n##### Small");
        let paras = paragraphs(&units);

        assert_eq!(paras[0].role, ParagraphRole::Heading(1));
        assert_eq!(paras[0].runs[0].format.size, Some(18.0));
        assert_eq!(paras[0].runs[0].format.color, Some(Rgb::new(0, 51, 102)));
        assert!(paras[0].format.keep_with_next);

        assert_eq!(paras[1].role, ParagraphRole::Heading(5));
        assert_eq!(paras[1].runs[0].format, RunFormat::default());
    }

    #[test]
    fn configured_minor_headings() {
        let config = Config::from_overrides(serde_json::json!({
            "styles": { "h5": { "font_size": 40, "bold": true } }
        }))
        .unwrap();
        let units = render(&config, "##### Five\n###### Six");
        let paras = paragraphs(&units);

        assert_eq!(paras[0].role, ParagraphRole::Heading(5));
        assert_eq!(paras[0].runs[0].format.size, Some(40.0));
        assert!(paras[0].runs[0].format.bold);
        assert_eq!(paras[1].role, ParagraphRole::Heading(6));
        assert_eq!(paras[1].runs[0].format, RunFormat::default());
    }

    #[test]
    fn spans_layer_over_base_profile() {
        let config = Config::default();
        let units = render(&config, "plain `code` [site](https://a.example) **b**");
        let runs = &paragraphs(&units)[0].runs;

        assert_eq!(runs[0].format.font.as_deref(), Some("Times New Roman"));
        assert_eq!(runs[1].format.font.as_deref(), Some("Consolas"));
        assert_eq!(runs[1].format.color, Some(Rgb::new(128, 0, 128)));
        assert!(runs[3].format.underline);
        assert_eq!(runs[3].link.as_deref(), Some("https://a.example"));
        assert!(runs[5].format.bold);
        assert_eq!(runs[5].format.size, Some(11.0));
    }

    #[test]
    fn nested_lists_indent_by_depth() {
        let config = Config::default();
        let units = render(&config, "- a\n  - b\n    - c\n- d\n1. e");
        let entries: Vec<_> = paragraphs(&units)
            .into_iter()
            .map(|para| match para.role {
                ParagraphRole::ListEntry {
                    ordered,
                    depth,
                    instance,
                } => (para.text(), ordered, depth, instance, para.format.left_indent),
                role => panic!("unexpected {role:?}"),
            })
            .collect();

        assert_eq!(
            entries,
            [
                ("a".to_string(), false, 0, 1, Some(0.5)),
                ("b".to_string(), false, 1, 2, Some(1.0)),
                ("c".to_string(), false, 2, 3, Some(1.5)),
                ("d".to_string(), false, 0, 1, Some(0.5)),
                ("e".to_string(), true, 0, 4, Some(0.5)),
            ]
        );
    }

    #[test]
    fn table_header_is_bold_and_filled() {
        let config = Config::default();
        let units = render(&config, "|A|B|\n|---|---|\n|1|2|3|\n|4|");
        let Unit::Table(table) = &units[0] else {
            panic!("expected a table");
        };

        assert_eq!(table.columns, 2);
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows[0].iter().all(|cell| cell.format.bold && cell.header));
        assert_eq!(table.rows[0][0].fill, Some(Rgb::new(240, 240, 240)));
        assert!(!table.rows[1][0].format.bold);
        assert_eq!(table.rows[1][1].text.as_str(), "2");
        assert_eq!(table.rows[2][1].text.as_str(), "");
        assert_eq!(table.rows[1][0].format.size, Some(10.0));
        assert!(matches!(&units[1], Unit::Paragraph(para) if para.runs.is_empty()));
    }

    #[test]
    fn code_block_with_label() {
        let config = Config::default();
        let units = render(&config, "```rust\nfn main() {\n    **x**\n}\n```");
        let paras = paragraphs(&units);

        assert_eq!(paras[0].role, ParagraphRole::CodeLabel);
        assert_eq!(paras[0].text(), "Code (rust):");
        assert!(paras[0].runs[0].format.bold);

        assert_eq!(paras[1].role, ParagraphRole::Code);
        assert_eq!(paras[1].text(), "fn main() {\n    **x**\n}");
        assert_eq!(paras[1].format.shading, Some(Rgb::new(245, 245, 245)));
        assert_eq!(paras[1].runs[0].format.font.as_deref(), Some("Consolas"));
    }

    #[test]
    fn code_block_without_language() {
        let units = render(&Config::default(), "```\nplain\n```");
        assert_eq!(paragraphs(&units)[0].role, ParagraphRole::Code);
    }

    #[test]
    fn missing_image_placeholder() {
        let units = render(&Config::default(), "![A chart](figures/chart.png)");
        let paras = paragraphs(&units);

        assert_eq!(paras.len(), 1);
        assert_eq!(paras[0].role, ParagraphRole::Placeholder);
        assert_eq!(paras[0].text(), "[Image not found: chart.png]");
    }

    #[test]
    fn profile_overrides_apply() {
        let config = Config::from_overrides(serde_json::json!({
            "styles": {
                "normal": { "font_name": "Georgia", "alignment": "justify" },
                "list_item": { "left_indent": 0.25 }
            }
        }))
        .unwrap();
        let units = render(&config, "text\n- item");
        let paras = paragraphs(&units);

        assert_eq!(paras[0].runs[0].format.font.as_deref(), Some("Georgia"));
        assert_eq!(
            paras[0].format.alignment,
            Some(crate::config::Alignment::Justify)
        );
        assert_eq!(paras[1].format.left_indent, Some(0.25));
    }
}
