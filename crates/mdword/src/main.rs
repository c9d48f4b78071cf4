#![doc = include_str!("../README.md")]

use std::path::{Path, PathBuf};
use std::process::exit;

use clap::Parser;
use log::LevelFilter;
use mdword::{Config, Error, MdWord, Result};

/// Converts markdown files into a single Word document.
#[derive(Debug, Clone, Parser)]
#[clap(name = "mdword", version, about)]
pub struct ConvertArgs {
    /// Markdown files, converted in the given order
    #[clap(value_name = "INPUT", required_unless_present = "create_config")]
    pub inputs: Vec<PathBuf>,

    /// Path to output file. A `.txt` extension dumps the document as text
    #[clap(short, long, value_name = "OUTPUT", default_value = "output.docx")]
    pub output: PathBuf,

    /// Path to a JSON or TOML file overriding the default configuration
    #[clap(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Writes the default configuration and exits
    #[clap(
        long,
        value_name = "PATH",
        num_args = 0..=1,
        default_missing_value = "config.json"
    )]
    pub create_config: Option<PathBuf>,
}

fn main() {
    let args = ConvertArgs::parse();

    let _ = env_logger::builder()
        .filter_module("mdword", LevelFilter::Info)
        .try_init();

    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        exit(1);
    }
}

fn run(args: ConvertArgs) -> Result<()> {
    if let Some(path) = &args.create_config {
        return create_config(path);
    }

    let config = Config::load(args.config.as_deref());
    MdWord::new(config).convert_files(&args.inputs, &args.output)?;
    println!("Saved {}", args.output.display());
    Ok(())
}

fn create_config(path: &Path) -> Result<()> {
    let content = Config::default().to_json_pretty()?;
    std::fs::write(path, content)
        .map_err(|err| Error::from(err).context(format!("cannot write {}", path.display())))?;
    println!("Default configuration written to {}", path.display());
    Ok(())
}
