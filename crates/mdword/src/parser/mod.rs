//! Markdown parsing: block classification and inline spans.

pub mod block;
pub mod inline;
pub mod list;
pub mod table;

pub use block::{Block, parse_blocks};
pub use inline::{InlineSpan, SpanKind, tokenize};
pub use list::{ListItem, ListKind};
