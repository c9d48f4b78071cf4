//! Chapters: one input file each.

use std::path::{Path, PathBuf};

use ecow::EcoString;

use crate::parser::{Block, parse_blocks};
use crate::{Error, Result};

/// One input file's worth of blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// The text of the first level-1 heading, if any.
    pub title: Option<EcoString>,
    /// The name of the originating file.
    pub file_name: EcoString,
    /// The directory relative image paths are resolved against.
    pub base_dir: PathBuf,
    pub blocks: Vec<Block>,
}

impl Chapter {
    /// Parses a chapter from its source text.
    pub fn parse(path: &Path, text: &str) -> Self {
        let blocks = parse_blocks(text);
        let title = blocks.iter().find_map(|block| match block {
            Block::Heading { level: 1, text } => Some(text.clone()),
            _ => None,
        });
        let file_name = path
            .file_name()
            .map_or_else(|| path.to_string_lossy(), |name| name.to_string_lossy());
        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Self {
            title,
            file_name: file_name.as_ref().into(),
            base_dir,
            blocks,
        }
    }

    /// Reads and parses a chapter from a file.
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| Error::from(err).context(format!("cannot read {}", path.display())))?;
        Ok(Self::parse(path, &text))
    }

    /// The chapter title, falling back to `default` without a level-1 heading.
    pub fn title_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_from_first_level_one_heading() {
        let chapter = Chapter::parse(
            Path::new("docs/intro.md"),
            "## Sub\n```\n# In code\n```\n# Real Title\n# Second",
        );
        assert_eq!(chapter.title.as_deref(), Some("Real Title"));
        assert_eq!(chapter.file_name.as_str(), "intro.md");
        assert_eq!(chapter.base_dir, Path::new("docs"));
    }

    #[test]
    fn default_title() {
        let chapter = Chapter::parse(Path::new("notes.md"), "no heading here");
        assert_eq!(chapter.title, None);
        assert_eq!(chapter.title_or("Chapter"), "Chapter");
        assert_eq!(chapter.base_dir, Path::new("."));
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Chapter::read(&dir.path().join("missing.md")).unwrap_err();
        assert!(err.to_string().contains("missing.md"));
    }
}
