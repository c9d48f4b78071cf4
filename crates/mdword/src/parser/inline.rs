//! Inline span tokenizer.
//!
//! Scans a line for bold (`**x**`, `__x__`), italic (`*x*`, `_x_`), inline
//! code (`` `x` ``) and link (`[text](url)`) spans. The span starting first
//! wins; spans starting at the same position are preferred in the order bold,
//! italic, code, link.

use ecow::EcoString;

/// The kind of an inline span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    Plain,
    Bold,
    Italic,
    Code,
    Link,
}

/// A typed run of text within a line, with its delimiters stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InlineSpan {
    pub kind: SpanKind,
    pub text: EcoString,
    /// The target of a link span.
    pub target: Option<EcoString>,
}

impl InlineSpan {
    pub fn plain(text: impl Into<EcoString>) -> Self {
        Self {
            kind: SpanKind::Plain,
            text: text.into(),
            target: None,
        }
    }

    pub fn new(kind: SpanKind, text: impl Into<EcoString>) -> Self {
        Self {
            kind,
            text: text.into(),
            target: None,
        }
    }

    pub fn link(text: impl Into<EcoString>, target: impl Into<EcoString>) -> Self {
        Self {
            kind: SpanKind::Link,
            text: text.into(),
            target: Some(target.into()),
        }
    }
}

/// A span found in the remaining text. Offsets are byte offsets.
struct Found<'a> {
    start: usize,
    end: usize,
    kind: SpanKind,
    text: &'a str,
    target: Option<&'a str>,
}

/// Splits a line into inline spans.
pub fn tokenize(line: &str) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    let mut rest = line;

    while let Some(found) = find_span(rest) {
        push_span(&mut spans, SpanKind::Plain, &rest[..found.start], None);
        push_span(&mut spans, found.kind, found.text, found.target);
        rest = &rest[found.end..];
    }
    push_span(&mut spans, SpanKind::Plain, rest, None);

    spans
}

/// Concatenates the visible text of spans.
pub fn visible_text(spans: &[InlineSpan]) -> String {
    spans.iter().map(|span| span.text.as_str()).collect()
}

fn push_span(spans: &mut Vec<InlineSpan>, kind: SpanKind, text: &str, target: Option<&str>) {
    if text.is_empty() {
        return;
    }

    // an empty typed span may have split two plain runs
    if kind == SpanKind::Plain
        && let Some(last) = spans.last_mut()
        && last.kind == SpanKind::Plain
    {
        last.text.push_str(text);
        return;
    }

    spans.push(InlineSpan {
        kind,
        text: text.into(),
        target: target.map(EcoString::from),
    });
}

fn find_span(rest: &str) -> Option<Found<'_>> {
    // All delimiters are ASCII, so byte positions are char boundaries.
    rest.bytes().enumerate().find_map(|(i, b)| match b {
        b'*' | b'_' => bold_at(rest, i).or_else(|| italic_at(rest, i)),
        b'`' => code_at(rest, i),
        b'[' => link_at(rest, i),
        _ => None,
    })
}

fn bold_at(rest: &str, start: usize) -> Option<Found<'_>> {
    let delim = rest.get(start..start + 2)?;
    if delim != "**" && delim != "__" {
        return None;
    }

    let inner = start + 2;
    let close = inner + rest[inner..].find(delim)?;
    Some(Found {
        start,
        end: close + 2,
        kind: SpanKind::Bold,
        text: &rest[inner..close],
        target: None,
    })
}

fn italic_at(rest: &str, start: usize) -> Option<Found<'_>> {
    let delim = rest.as_bytes()[start];
    let inner = start + 1;
    if rest.as_bytes().get(inner).is_none_or(|&b| b == delim) {
        return None;
    }

    let close = inner + rest[inner..].find(char::from(delim))?;
    Some(Found {
        start,
        end: close + 1,
        kind: SpanKind::Italic,
        text: &rest[inner..close],
        target: None,
    })
}

fn code_at(rest: &str, start: usize) -> Option<Found<'_>> {
    let inner = start + 1;
    let close = inner + rest[inner..].find('`')?;
    Some(Found {
        start,
        end: close + 1,
        kind: SpanKind::Code,
        text: &rest[inner..close],
        target: None,
    })
}

fn link_at(rest: &str, start: usize) -> Option<Found<'_>> {
    let inner = start + 1;
    let text_end = inner + rest[inner..].find("](")?;
    let target_start = text_end + 2;
    let target_end = target_start + rest[target_start..].find(')')?;
    Some(Found {
        start,
        end: target_end + 1,
        kind: SpanKind::Link,
        text: &rest[inner..text_end],
        target: Some(&rest[target_start..target_end]),
    })
}
