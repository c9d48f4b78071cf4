use std::path::{Path, PathBuf};

use image::RgbImage;
use mdword::fetch::{ImageFetcher, OfflineFetcher};
use mdword::{Config, MdWord, Result};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

fn save_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    RgbImage::new(width, height).save(path).unwrap();
}

fn offline(config: Config) -> MdWord {
    MdWord::new(config).with_fetcher(Box::new(OfflineFetcher))
}

/// Serves every URL from one local PNG.
struct LocalFetcher {
    image: PathBuf,
    requests: Vec<String>,
}

impl ImageFetcher for LocalFetcher {
    fn fetch(&mut self, url: &str) -> Result<PathBuf> {
        self.requests.push(url.to_owned());
        Ok(self.image.clone())
    }
}

#[test]
fn writes_docx_from_files() {
    let dir = TempDir::new().unwrap();
    save_png(&dir.path().join("images/pic.png"), 40, 20);
    let intro = write(
        dir.path(),
        "intro.md",
        "# Intro\n\nHello *world*.\n\n![A picture](images/pic.png)\n",
    );
    let usage = write(dir.path(), "usage.md", "# Usage\n\n1. run\n2. read\n");
    let output = dir.path().join("book.docx");

    offline(Config::default())
        .convert_files([&intro, &usage], &output)
        .unwrap();

    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn writes_text_dump_for_txt_output() {
    let dir = TempDir::new().unwrap();
    save_png(&dir.path().join("images/pic.png"), 40, 20);
    let intro = write(
        dir.path(),
        "intro.md",
        "# Intro\n![A picture](images/pic.png)\n![](images/gone.png)\n",
    );
    let output = dir.path().join("book.txt");

    offline(Config::default())
        .convert_files([&intro], &output)
        .unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("=== chapter \"Intro\" from intro.md"));
    assert!(text.contains("[image images/pic.png (381000x190500 EMU)]\nFigure: A picture\n"));
    assert!(text.contains("[Image not found: gone.png]"));
}

#[test]
fn wide_images_are_scaled_down() {
    let dir = TempDir::new().unwrap();
    save_png(&dir.path().join("wide.png"), 2000, 1000);
    let input = write(dir.path(), "doc.md", "![](wide.png)");
    let output = dir.path().join("out.txt");

    offline(Config::default())
        .convert_files([&input], &output)
        .unwrap();

    // 15 cm wide, keeping the aspect ratio
    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("[image wide.png (5400000x2700000 EMU)]"));
}

#[test]
fn remote_images_use_the_fetcher() {
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("fetched.png");
    save_png(&image, 10, 10);
    let input = write(
        dir.path(),
        "doc.md",
        "![Logo](https://example.com/logo.png)",
    );
    let output = dir.path().join("out.txt");

    let fetcher = LocalFetcher {
        image,
        requests: Vec::new(),
    };
    MdWord::new(Config::default())
        .with_fetcher(Box::new(fetcher))
        .convert_files([&input], &output)
        .unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("[image https://example.com/logo.png (95250x95250 EMU)]"));
    assert!(text.contains("Figure: Logo"));
}

#[test]
fn offline_remote_images_become_placeholders() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "doc.md", "![](http://example.com/a.png)");
    let output = dir.path().join("out.txt");

    offline(Config::default())
        .convert_files([&input], &output)
        .unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("[Remote image not downloaded: http://example.com/a.png]"));
}

#[test]
fn configuration_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let config = write(
        dir.path(),
        "config.json",
        r#"{ "document": { "generate_toc": false, "add_file_headers": false } }"#,
    );
    let input = write(dir.path(), "doc.md", "# Only");
    let output = dir.path().join("out.txt");

    offline(Config::load(Some(config.as_path())))
        .convert_files([&input], &output)
        .unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(!text.contains("=== contents"));
    assert!(!text.contains("File: doc.md"));
    assert!(text.contains("# Only"));
}

#[test]
fn missing_input_is_fatal() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.md");
    let output = dir.path().join("out.docx");

    let err = offline(Config::default())
        .convert_files([&missing], &output)
        .unwrap_err();

    assert!(err.to_string().contains("missing.md"));
    assert!(!output.exists());
}

#[test]
fn unwritable_output_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "doc.md", "text");
    let output = dir.path().join("no-such-dir").join("out.docx");

    let err = offline(Config::default())
        .convert_files([&input], &output)
        .unwrap_err();

    assert!(err.to_string().contains("out.docx"));
}
