//! # mdword
//!
//! Converts markdown chapters into a single styled Word document.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use mdword::{Config, MdWord};
//!
//! let config = Config::load(Some(Path::new("config.json")));
//! MdWord::new(config).convert_files(["intro.md", "usage.md"], Path::new("book.docx"))?;
//! # Ok::<(), mdword::Error>(())
//! ```

pub mod assemble;
pub mod chapter;
pub mod common;
pub mod config;
mod error;
pub mod fetch;
pub mod ir;
pub mod parser;
pub mod render;
pub mod writer;

use std::path::Path;

use ecow::EcoString;
use log::info;

pub use error::*;

pub use crate::chapter::Chapter;
pub use crate::common::Format;
pub use crate::config::Config;
use crate::fetch::ImageFetcher;
use crate::writer::create_writer;

/// The result type for mdword.
pub type Result<T, Err = Error> = std::result::Result<T, Err>;

/// Task builder for converting markdown chapters.
pub struct MdWord {
    config: Config,
    /// Retrieves remote images.
    fetcher: Box<dyn ImageFetcher>,
}

impl MdWord {
    /// Creates a converter, downloading remote images if the `remote` feature
    /// is enabled.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            fetcher: fetch::default_fetcher(),
        }
    }

    /// Sets the remote image retriever.
    pub fn with_fetcher(mut self, fetcher: Box<dyn ImageFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Assembles chapters into the output model.
    pub fn assemble(&mut self, chapters: &[Chapter]) -> ir::Document {
        assemble::assemble(&self.config, chapters, self.fetcher.as_mut())
    }

    /// Converts chapters to the bytes of a document in the given format.
    pub fn convert(&mut self, chapters: &[Chapter], format: Format) -> Result<Vec<u8>> {
        let document = self.assemble(chapters);
        create_writer(format).write_vec(&document)
    }

    /// Converts chapters to the plain-text dump of the assembled document.
    pub fn to_text_string(&mut self, chapters: &[Chapter]) -> Result<EcoString> {
        let document = self.assemble(chapters);
        let mut output = EcoString::new();
        create_writer(Format::Text).write_eco(&document, &mut output)?;
        Ok(output)
    }

    /// Reads the input files in order and writes one document to `output`.
    /// The output format follows the extension of `output`.
    pub fn convert_files(
        &mut self,
        inputs: impl IntoIterator<Item = impl AsRef<Path>>,
        output: &Path,
    ) -> Result<()> {
        let chapters = inputs
            .into_iter()
            .map(|input| Chapter::read(input.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let bytes = self.convert(&chapters, Format::from_path(output))?;
        std::fs::write(output, bytes)
            .map_err(|err| Error::from(err).context(format!("cannot write {}", output.display())))?;

        info!("conversion finished: {}", output.display());
        Ok(())
    }
}
