//! List item recognition and nesting.

use std::iter::Peekable;
use std::sync::LazyLock;

use regex::Regex;

use super::inline::{InlineSpan, tokenize};

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)([*\-+]|\d+\.)\s+(.+)$").expect("list item pattern is valid")
});

/// Whether a list is numbered or bulleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Ordered,
    Unordered,
}

/// A single list line, before nesting is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLine {
    pub kind: ListKind,
    /// Leading whitespace width divided by two.
    pub level: usize,
    pub spans: Vec<InlineSpan>,
}

/// A list item with its nested items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub kind: ListKind,
    pub spans: Vec<InlineSpan>,
    pub children: Vec<ListItem>,
}

impl ListLine {
    /// Recognizes a list line.
    pub fn parse(line: &str) -> Option<Self> {
        let caps = LIST_ITEM.captures(line)?;
        let indent = caps.get(1).map_or(0, |m| m.as_str().chars().count());
        let marker = caps.get(2).map_or("", |m| m.as_str());
        let content = caps.get(3).map_or("", |m| m.as_str());

        let kind = if marker.ends_with('.') {
            ListKind::Ordered
        } else {
            ListKind::Unordered
        };

        Some(Self {
            kind,
            level: indent / 2,
            spans: tokenize(content),
        })
    }
}

/// Nests a run of list lines into a forest.
///
/// A line becomes a child of the closest preceding line with a smaller level.
/// A line indented less than the first line of the run is a root.
pub fn build_tree(lines: Vec<ListLine>) -> Vec<ListItem> {
    collect_items(&mut lines.into_iter().peekable(), 0)
}

fn collect_items(
    lines: &mut Peekable<impl Iterator<Item = ListLine>>,
    min_level: usize,
) -> Vec<ListItem> {
    let mut items = Vec::new();
    while let Some(line) = lines.next_if(|line| line.level >= min_level) {
        let children = collect_items(lines, line.level + 1);
        items.push(ListItem {
            kind: line.kind,
            spans: line.spans,
            children,
        });
    }
    items
}
