//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Append a research paper to your note log, reference library, and
/// slide deck.
///
/// Paperflow resolves bibliographic metadata for the given identifier
/// (DOI, arXiv reference, URL, or local PDF path) and fans out to the
/// enabled sinks. Output paths derive from the library name.
#[derive(Parser, Debug)]
#[command(name = "paperflow")]
#[command(author, version, about)]
pub struct Args {
    /// Paper identifier: DOI, arXiv URL/id, URL, or local PDF path
    pub identifier: String,

    /// Target library; determines note and deck paths by convention
    #[arg(short = 'l', long, default_value = "inbox")]
    pub library: String,

    /// Manual title override (wins over every resolver step)
    #[arg(long)]
    pub title: Option<String>,

    /// Why the paper matters
    #[arg(short = 'r', long, default_value = "")]
    pub relevance: String,

    /// How the paper will be used
    #[arg(short = 'a', long, default_value = "")]
    pub application: String,

    /// Comma-separated tags
    #[arg(short = 't', long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Comma-separated PDF attachment paths (must exist)
    #[arg(long, value_delimiter = ',')]
    pub pdf: Vec<PathBuf>,

    /// Slide theme template (falls back to PAPERFLOW_PPT_THEME)
    #[arg(long)]
    pub theme: Option<PathBuf>,

    /// Slide layout index (falls back to PAPERFLOW_PPT_LAYOUT)
    #[arg(long)]
    pub layout: Option<usize>,

    /// Explicit deck path, bypassing the library convention
    #[arg(long)]
    pub deck: Option<PathBuf>,

    /// Skip bibliography registration
    #[arg(long)]
    pub no_papis: bool,

    /// Skip slide generation
    #[arg(long)]
    pub no_ppt: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
