//! Style profiles and document settings.
//!
//! The built-in defaults are an immutable value produced by [`Config::default`].
//! User overrides are applied by serializing the defaults into a JSON tree,
//! deep-merging the override tree into it ([`merge_values`]) and deserializing
//! the result, so a profile field missing from the override keeps its default.

use std::ffi::OsStr;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// An RGB color. Missing channels default to zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The color as a `RRGGBB` hex string.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Horizontal paragraph alignment.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// A named bundle of visual attributes. Unset fields leave the output
/// unformatted in that respect.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    /// Font size in points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Rgb>,
    /// Spacing before the paragraph in points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_before: Option<f64>,
    /// Spacing after the paragraph in points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_after: Option<f64>,
    /// Line spacing as a multiple of single spacing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<f64>,
    /// Left indent in inches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_indent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_with_next: Option<bool>,
    /// Fill of table header cells.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_bg_color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Rgb>,
}

/// Roles the renderer resolves profiles for, besides headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleRole {
    Normal,
    Code,
    CodeBlock,
    ListItem,
    Table,
    Caption,
    TocHeading,
    TocItem,
}

/// The style profiles keyed by role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSheet {
    pub h1: StyleProfile,
    pub h2: StyleProfile,
    pub h3: StyleProfile,
    pub h4: StyleProfile,
    /// Optional, headings of these levels are unstyled by default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h5: Option<StyleProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h6: Option<StyleProfile>,
    pub normal: StyleProfile,
    pub code: StyleProfile,
    pub code_block: StyleProfile,
    pub list_item: StyleProfile,
    pub table: StyleProfile,
    pub caption: StyleProfile,
    pub toc_heading: StyleProfile,
    pub toc_item: StyleProfile,
}

impl StyleSheet {
    /// Resolves the profile of a role.
    pub fn get(&self, role: StyleRole) -> &StyleProfile {
        match role {
            StyleRole::Normal => &self.normal,
            StyleRole::Code => &self.code,
            StyleRole::CodeBlock => &self.code_block,
            StyleRole::ListItem => &self.list_item,
            StyleRole::Table => &self.table,
            StyleRole::Caption => &self.caption,
            StyleRole::TocHeading => &self.toc_heading,
            StyleRole::TocItem => &self.toc_item,
        }
    }

    /// Resolves the profile of a heading level. Levels without a profile
    /// are rendered unstyled.
    pub fn heading(&self, level: u8) -> Option<&StyleProfile> {
        match level {
            1 => Some(&self.h1),
            2 => Some(&self.h2),
            3 => Some(&self.h3),
            4 => Some(&self.h4),
            5 => self.h5.as_ref(),
            6 => self.h6.as_ref(),
            _ => None,
        }
    }
}

fn heading_profile(size: f64, color: Rgb, before: f64, after: f64) -> StyleProfile {
    StyleProfile {
        font_name: Some("Arial".into()),
        font_size: Some(size),
        bold: Some(true),
        color: Some(color),
        space_before: Some(before),
        space_after: Some(after),
        keep_with_next: Some(true),
        ..Default::default()
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        let black = Rgb::new(0, 0, 0);
        Self {
            h1: heading_profile(18.0, Rgb::new(0, 51, 102), 24.0, 12.0),
            h2: heading_profile(16.0, Rgb::new(0, 102, 153), 18.0, 10.0),
            h3: heading_profile(14.0, Rgb::new(0, 153, 204), 14.0, 8.0),
            h4: heading_profile(12.0, Rgb::new(0, 153, 204), 12.0, 6.0),
            h5: None,
            h6: None,
            normal: StyleProfile {
                font_name: Some("Times New Roman".into()),
                font_size: Some(11.0),
                color: Some(black),
                space_after: Some(8.0),
                line_spacing: Some(1.15),
                ..Default::default()
            },
            code: StyleProfile {
                font_name: Some("Consolas".into()),
                font_size: Some(10.0),
                color: Some(Rgb::new(128, 0, 128)),
                space_after: Some(8.0),
                ..Default::default()
            },
            code_block: StyleProfile {
                font_name: Some("Consolas".into()),
                font_size: Some(10.0),
                color: Some(black),
                background: Some(Rgb::new(245, 245, 245)),
                space_before: Some(8.0),
                space_after: Some(8.0),
                ..Default::default()
            },
            list_item: StyleProfile {
                font_name: Some("Times New Roman".into()),
                font_size: Some(11.0),
                color: Some(black),
                space_after: Some(0.0),
                left_indent: Some(0.5),
                ..Default::default()
            },
            table: StyleProfile {
                font_name: Some("Times New Roman".into()),
                font_size: Some(10.0),
                header_bg_color: Some(Rgb::new(240, 240, 240)),
                border_color: Some(black),
                space_before: Some(12.0),
                space_after: Some(12.0),
                ..Default::default()
            },
            caption: StyleProfile {
                font_name: Some("Times New Roman".into()),
                font_size: Some(10.0),
                italic: Some(true),
                color: Some(Rgb::new(80, 80, 80)),
                space_before: Some(6.0),
                space_after: Some(12.0),
                alignment: Some(Alignment::Center),
                ..Default::default()
            },
            toc_heading: StyleProfile {
                font_name: Some("Arial".into()),
                font_size: Some(16.0),
                bold: Some(true),
                color: Some(black),
                space_before: Some(24.0),
                space_after: Some(12.0),
                ..Default::default()
            },
            toc_item: StyleProfile {
                font_name: Some("Times New Roman".into()),
                font_size: Some(11.0),
                color: Some(black),
                space_after: Some(3.0),
                ..Default::default()
            },
        }
    }
}

/// Page margins in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 2.5,
            bottom: 2.5,
            left: 2.5,
            right: 2.5,
        }
    }
}

/// Page size in centimeters. Defaults to A4.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl Default for PageSize {
    fn default() -> Self {
        Self {
            width: 21.0,
            height: 29.7,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// A header or footer template. `{chapter}` and `{page}` are substituted per
/// section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderFooterSettings {
    pub enabled: bool,
    pub content: String,
    pub first_page_different: bool,
}

impl Default for HeaderFooterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            content: String::new(),
            first_page_different: true,
        }
    }
}

/// Document-wide layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    /// Opens every chapter with a heading naming its source file.
    pub add_file_headers: bool,
    pub page_break_between_files: bool,
    pub margins: Margins,
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub generate_toc: bool,
    pub toc_title: String,
    /// The deepest heading level listed in the table of contents.
    pub toc_levels: u8,
    pub header: HeaderFooterSettings,
    pub footer: HeaderFooterSettings,
    /// Maximum image width in centimeters.
    pub image_max_width: f64,
    /// Title of a chapter without a level-1 heading.
    pub default_chapter_title: String,
    /// Text of the file-name heading, `{file}` is the file name.
    pub file_header_format: String,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            add_file_headers: true,
            page_break_between_files: true,
            margins: Margins::default(),
            page_size: PageSize::default(),
            orientation: Orientation::Portrait,
            generate_toc: true,
            toc_title: "Table of Contents".into(),
            toc_levels: 3,
            header: HeaderFooterSettings {
                content: "{chapter}".into(),
                ..Default::default()
            },
            footer: HeaderFooterSettings {
                content: "Page {page}".into(),
                ..Default::default()
            },
            image_max_width: 15.0,
            default_chapter_title: "Chapter".into(),
            file_header_format: "File: {file}".into(),
        }
    }
}

impl DocumentSettings {
    /// The page size with the orientation applied, as `(width, height)` in
    /// centimeters.
    pub fn oriented_page_size(&self) -> (f64, f64) {
        let PageSize { width, height } = self.page_size;
        match self.orientation {
            Orientation::Landscape if width < height => (height, width),
            _ => (width, height),
        }
    }

    /// The text of the heading naming a chapter's source file.
    pub fn file_header(&self, file_name: &str) -> String {
        self.file_header_format.replace("{file}", file_name)
    }
}

/// The complete configuration of a conversion.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub styles: StyleSheet,
    pub document: DocumentSettings,
}

impl Config {
    /// Loads the configuration, applying an optional override file on top of
    /// the defaults.
    ///
    /// A missing or malformed override file is reported as a warning and the
    /// defaults are used instead.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match Self::try_load(path) {
            Ok(config) => {
                info!("loaded configuration from {}", path.display());
                config
            }
            Err(err) => {
                warn!(
                    "failed to load configuration {}: {err}, using the defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Loads the configuration from an override file, failing on any error.
    ///
    /// Files with a `.toml` extension are parsed as TOML, anything else as
    /// JSON.
    pub fn try_load(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|e| Error::from(e).context(path.display()))?;
        let overrides: Value = match path.extension().and_then(OsStr::to_str) {
            Some("toml") => toml::from_str(&text)?,
            _ => serde_json::from_str(&text)?,
        };
        Self::from_overrides(overrides)
    }

    /// Merges an override tree into the defaults.
    pub fn from_overrides(overrides: Value) -> Result<Self> {
        let mut tree = serde_json::to_value(Self::default())?;
        merge_values(&mut tree, overrides);
        Ok(serde_json::from_value(tree)?)
    }

    /// Renders the configuration as a pretty-printed JSON document.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Recursively merges `overlay` into `base`.
///
/// A mapping in `overlay` merges into the mapping at the same key of `base`;
/// any other value replaces it. Keys absent from `overlay` are kept.
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let nested = value.is_object() && base.get(&key).is_some_and(Value::is_object);
                if nested {
                    if let Some(slot) = base.get_mut(&key) {
                        merge_values(slot, value);
                    }
                } else {
                    base.insert(key, value);
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_override_keeps_defaults() {
        let config = Config::from_overrides(json!({})).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn leaf_override_keeps_siblings() {
        let config = Config::from_overrides(json!({
            "styles": { "h1": { "font_size": 30 } }
        }))
        .unwrap();

        let defaults = StyleSheet::default();
        assert_eq!(config.styles.h1.font_size, Some(30.0));
        assert_eq!(config.styles.h1.font_name, defaults.h1.font_name);
        assert_eq!(config.styles.h1.color, defaults.h1.color);
        assert_eq!(config.styles.h2, defaults.h2);
        assert_eq!(config.document, DocumentSettings::default());
    }

    #[test]
    fn nested_color_merges_per_channel() {
        let config = Config::from_overrides(json!({
            "styles": { "h2": { "color": { "r": 255 } } }
        }))
        .unwrap();
        assert_eq!(config.styles.h2.color, Some(Rgb::new(255, 102, 153)));
    }

    #[test]
    fn new_fields_and_unknown_keys() {
        let config = Config::from_overrides(json!({
            "styles": { "normal": { "italic": true }, "unknown_role": { "bold": true } },
            "document": { "generate_toc": false, "whatever": 1 }
        }))
        .unwrap();
        assert_eq!(config.styles.normal.italic, Some(true));
        assert!(!config.document.generate_toc);
    }

    #[test]
    fn scalar_replacing_profile_is_rejected() {
        assert!(Config::from_overrides(json!({ "styles": { "h1": 5 } })).is_err());
    }

    #[test]
    fn merge_replaces_scalars_and_lists() {
        let mut base = json!({ "a": { "b": 1, "c": [1, 2] }, "d": "x" });
        merge_values(&mut base, json!({ "a": { "c": [3] }, "d": { "e": true } }));
        assert_eq!(base, json!({ "a": { "b": 1, "c": [3] }, "d": { "e": true } }));
    }

    #[test]
    fn load_falls_back_on_bad_input() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert_eq!(Config::load(Some(&missing)), Config::default());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert_eq!(Config::load(Some(&broken)), Config::default());

        assert_eq!(Config::load(None), Config::default());
    }

    #[test]
    fn load_json_and_toml() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("config.json");
        std::fs::write(&json_path, r#"{ "document": { "toc_title": "Contents" } }"#).unwrap();
        assert_eq!(Config::load(Some(&json_path)).document.toc_title, "Contents");

        let toml_path = dir.path().join("config.toml");
        std::fs::write(
            &toml_path,
            "[document]\norientation = \"landscape\"\n\n[styles.code]\nfont_name = \"Fira Code\"\n",
        )
        .unwrap();
        let config = Config::load(Some(&toml_path));
        assert_eq!(config.document.orientation, Orientation::Landscape);
        assert_eq!(config.styles.code.font_name.as_deref(), Some("Fira Code"));
        assert_eq!(config.styles.code.font_size, Some(10.0));
    }

    #[test]
    fn default_document_round_trips() {
        let text = Config::default().to_json_pretty().unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(Config::from_overrides(value).unwrap(), Config::default());
    }

    #[test]
    fn landscape_swaps_page_size() {
        let mut settings = DocumentSettings::default();
        assert_eq!(settings.oriented_page_size(), (21.0, 29.7));
        settings.orientation = Orientation::Landscape;
        assert_eq!(settings.oriented_page_size(), (29.7, 21.0));
    }
}
