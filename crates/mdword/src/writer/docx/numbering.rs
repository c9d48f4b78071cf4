//! List numbering management for DOCX conversion

use std::collections::HashMap;

use docx_rs::*;

/// List numbering management for DOCX
///
/// Every list instance of the document gets its own numbering definition, so
/// that numbering restarts at 1 for each list.
#[derive(Clone, Debug)]
pub struct DocxNumbering {
    next_id: usize,
    instances: HashMap<usize, usize>,
}

impl Default for DocxNumbering {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxNumbering {
    /// Create a new numbering manager
    pub fn new() -> Self {
        Self {
            next_id: 1,
            instances: HashMap::new(),
        }
    }

    /// Create a list level with the specified parameters
    pub fn create_list_level(id: usize, format: &str, text: &str, is_bullet: bool) -> Level {
        let indent_size = 720 * (id + 1) as i32;
        let hanging_indent = if is_bullet { 360 } else { 420 };

        Level::new(
            id,
            Start::new(1),
            NumberFormat::new(format),
            LevelText::new(text),
            LevelJc::new("left"),
        )
        .indent(
            Some(indent_size),
            Some(SpecialIndentType::Hanging(hanging_indent)),
            None,
            None,
        )
    }

    /// Returns the numbering id of a list instance, defining it on first use.
    pub fn numbering_for(&mut self, docx: Docx, instance: usize, ordered: bool) -> (Docx, usize) {
        if let Some(&id) = self.instances.get(&instance) {
            return (docx, id);
        }

        let (docx, id) = if ordered {
            self.create_ordered_numbering(docx)
        } else {
            self.create_unordered_numbering(docx)
        };
        self.instances.insert(instance, id);
        (docx, id)
    }

    /// Create a new ordered list numbering, including a new AbstractNumbering instance
    fn create_ordered_numbering(&mut self, docx: Docx) -> (Docx, usize) {
        let id = self.next_id;
        self.next_id += 1;

        let mut ordered_abstract = AbstractNumbering::new(id);
        for i in 0..9 {
            let level_text = format!("%{}.", i + 1);
            let number_format = match i % 4 {
                0 => "decimal",
                1 => "lowerLetter",
                2 => "lowerRoman",
                _ => "upperRoman",
            };

            let mut ordered_level = Self::create_list_level(i, number_format, &level_text, false);
            if i > 0 {
                ordered_level = ordered_level.level_restart(0_u32);
            }
            ordered_abstract = ordered_abstract.add_level(ordered_level);
        }

        let docx = docx
            .add_abstract_numbering(ordered_abstract)
            .add_numbering(Numbering::new(id, id));

        (docx, id)
    }

    /// Create a new unordered list numbering, including a new AbstractNumbering instance
    fn create_unordered_numbering(&mut self, docx: Docx) -> (Docx, usize) {
        let id = self.next_id;
        self.next_id += 1;

        let mut unordered_abstract = AbstractNumbering::new(id);
        for i in 0..9 {
            let bullet_text = match i {
                0 => "•",
                1 => "○",
                2 => "▪",
                3 => "▫",
                4 => "◆",
                _ => "◇",
            };
            let unordered_level = Self::create_list_level(i, "bullet", bullet_text, true);
            unordered_abstract = unordered_abstract.add_level(unordered_level);
        }

        let docx = docx
            .add_abstract_numbering(unordered_abstract)
            .add_numbering(Numbering::new(id, id));

        (docx, id)
    }
}
