//! Line-oriented block classification.

use std::sync::LazyLock;

use ecow::EcoString;
use log::{debug, warn};
use regex::Regex;

use super::inline::{InlineSpan, tokenize};
use super::list::{ListItem, ListLine, build_tree};
use super::table::{is_table_line, table_rows};

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("heading pattern is valid"));
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!\[(.*?)\]\((.*?)\)").expect("image pattern is valid"));

const FENCE: &str = "```";

/// A classified unit of markdown input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        text: EcoString,
    },
    /// A run of list lines, nested into a forest.
    List(Vec<ListItem>),
    Table {
        rows: Vec<Vec<EcoString>>,
        has_header: bool,
    },
    CodeBlock {
        language: EcoString,
        lines: Vec<EcoString>,
    },
    Image {
        alt: EcoString,
        source: EcoString,
    },
    Blank,
    Paragraph(Vec<InlineSpan>),
}

enum LineState {
    Normal,
    InCodeFence {
        language: EcoString,
        lines: Vec<EcoString>,
    },
}

/// Classifies a markdown document into blocks.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let lines: Vec<&str> = text.lines().collect();
    BlockClassifier::new(&lines).run()
}

struct BlockClassifier<'a> {
    lines: &'a [&'a str],
    pos: usize,
    state: LineState,
    blocks: Vec<Block>,
}

impl<'a> BlockClassifier<'a> {
    fn new(lines: &'a [&'a str]) -> Self {
        Self {
            lines,
            pos: 0,
            state: LineState::Normal,
            blocks: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Block> {
        let source = self.lines;
        while let Some(&line) = source.get(self.pos) {
            match &mut self.state {
                LineState::InCodeFence { lines, .. } => {
                    if is_bare_fence(line) {
                        self.close_fence();
                    } else {
                        lines.push(line.into());
                    }
                    self.pos += 1;
                }
                LineState::Normal => self.classify_normal(line),
            }
        }

        if matches!(self.state, LineState::InCodeFence { .. }) {
            warn!("unterminated code fence at the end of the input");
            self.close_fence();
        }

        self.blocks
    }

    fn close_fence(&mut self) {
        if let LineState::InCodeFence { language, lines } =
            std::mem::replace(&mut self.state, LineState::Normal)
        {
            debug!("code block ({language}) with {} lines", lines.len());
            self.blocks.push(Block::CodeBlock { language, lines });
        }
    }

    fn classify_normal(&mut self, line: &str) {
        if let Some(language) = fence_language(line) {
            self.state = LineState::InCodeFence {
                language: language.into(),
                lines: Vec::new(),
            };
            self.pos += 1;
            return;
        }

        if let Some(caps) = HEADING.captures(line) {
            let level = caps.get(1).map_or(1, |m| m.len()) as u8;
            let text = caps.get(2).map_or("", |m| m.as_str()).trim();
            self.blocks.push(Block::Heading {
                level,
                text: text.into(),
            });
            self.pos += 1;
            return;
        }

        if ListLine::parse(line).is_some() {
            self.take_list();
            return;
        }

        if is_table_line(line) {
            self.take_table();
            return;
        }

        let block = if let Some(caps) = IMAGE.captures(line) {
            Block::Image {
                alt: caps.get(1).map_or("", |m| m.as_str()).into(),
                source: caps.get(2).map_or("", |m| m.as_str()).trim().into(),
            }
        } else if line.trim().is_empty() {
            Block::Blank
        } else {
            Block::Paragraph(tokenize(line))
        };
        self.blocks.push(block);
        self.pos += 1;
    }

    /// Takes a run of list lines. Blank lines between two lines of the same
    /// list are part of it.
    fn take_list(&mut self) {
        let mut items: Vec<ListLine> = Vec::new();
        while let Some(line) = self.lines.get(self.pos) {
            if let Some(item) = ListLine::parse(line) {
                items.push(item);
                self.pos += 1;
                continue;
            }

            let blanks = self.lines[self.pos..]
                .iter()
                .take_while(|line| line.trim().is_empty())
                .count();
            let loose = blanks > 0
                && self
                    .lines
                    .get(self.pos + blanks)
                    .and_then(|line| ListLine::parse(line))
                    .zip(items.first())
                    .is_some_and(|(next, first)| continues_list(first, &next));
            if !loose {
                break;
            }
            self.pos += blanks;
        }
        self.blocks.push(Block::List(build_tree(items)));
    }

    fn take_table(&mut self) {
        let start = self.pos;
        while self.lines.get(self.pos).is_some_and(|line| is_table_line(line)) {
            self.pos += 1;
        }

        let run = &self.lines[start..self.pos];
        match table_rows(run) {
            Some(rows) => self.blocks.push(Block::Table {
                rows,
                has_header: true,
            }),
            None => {
                debug!("pipe run of {} lines is not a table", run.len());
                let paragraphs = run.iter().map(|line| Block::Paragraph(tokenize(line)));
                self.blocks.extend(paragraphs);
            }
        }
    }
}

/// Whether a list line following blank lines continues the list opened by
/// `first`: it is nested deeper or has the same kind.
fn continues_list(first: &ListLine, next: &ListLine) -> bool {
    next.level > first.level || next.kind == first.kind
}

/// The language tag of a line opening a code fence.
fn fence_language(line: &str) -> Option<&str> {
    let line = line.trim();
    line.starts_with(FENCE).then(|| line.trim_start_matches('`').trim())
}

/// Whether a line closes a code fence: nothing but backticks, at least three.
fn is_bare_fence(line: &str) -> bool {
    let line = line.trim();
    line.starts_with(FENCE) && line.bytes().all(|b| b == b'`')
}
