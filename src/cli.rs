use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hirefinder")]
#[command(about = "Identifies the real hiring organization behind recruiter-posted job adverts")]
#[command(version)]
pub struct Cli {
    /// Create default configuration file at ./config/hirefinder.toml
    #[arg(long)]
    pub init: bool,

    /// Posting input file (.csv or .json) from the scraping collaborator
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output CSV file for enriched records
    #[arg(short, long, default_value = "identified_employers.csv")]
    pub output: PathBuf,

    /// Configuration file path (defaults to ./config/hirefinder.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Process at most this many postings
    #[arg(long)]
    pub limit: Option<usize>,

    /// Verbose logging (use -v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
