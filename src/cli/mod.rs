pub mod run;
pub mod schema;

use crate::item::Category;
use crate::view::SortMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chapterviz")]
#[command(
    author,
    version,
    about = "Turn a narrative chapter into illustrated scene and entity cards"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a chapter and illustrate every scene and entity
    Run(RunArgs),

    /// Print JSON Schema for config validation
    Schema,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    /// Chapter text file ("-" or omitted reads stdin)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, default_value = "chapterviz.yaml")]
    pub config: PathBuf,

    /// Write gallery.json and gallery.md here (default: <report_dir>/<timestamp>)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Skip writing the gallery export
    #[arg(long)]
    pub no_export: bool,

    /// Only show these categories (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub filter: Vec<Category>,

    /// Only show items whose title or description contains this text
    #[arg(long)]
    pub search: Option<String>,

    /// Display order
    #[arg(long, value_enum, default_value_t = SortMode::Appearance)]
    pub sort: SortMode,

    /// Replace an item's description before regenerating (ID=TEXT, repeatable)
    #[arg(long, value_parser = parse_describe)]
    pub describe: Vec<(String, String)>,

    /// Regenerate these items after the sweep (comma-separated ids)
    #[arg(long, value_delimiter = ',')]
    pub regenerate: Vec<String>,

    /// Override pause between image requests
    #[arg(long)]
    pub request_delay_ms: Option<u64>,
}

fn parse_describe(raw: &str) -> Result<(String, String), String> {
    let (id, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=TEXT, got '{}'", raw))?;
    if id.trim().is_empty() {
        return Err(format!("missing item id in '{}'", raw));
    }
    Ok((id.trim().to_string(), text.to_string()))
}
