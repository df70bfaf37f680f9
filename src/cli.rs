use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "runsheet",
    version,
    about = "County clerk search-result triage and ranking tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a scraped search-result batch, unranked.
    Ingest(IngestArgs),
    /// Parse, filter, and rank a batch for a target abstract/survey.
    Triage(TriageArgs),
    /// Report database counts.
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// JSON array of raw search results, as produced by the scraper.
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, default_value = ".cache/runsheet/clerk.db")]
    pub db_path: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct TriageArgs {
    /// JSON array of raw search results, as produced by the scraper.
    #[arg(long)]
    pub input: PathBuf,

    /// Target abstract number for the investigation.
    #[arg(long)]
    pub target_abstract: String,

    /// Target survey name for the investigation.
    #[arg(long)]
    pub target_survey: String,

    /// Previous-ownership date; records recorded before it are dropped.
    #[arg(long)]
    pub after: Option<NaiveDate>,

    /// Next-ownership date; records recorded after it are dropped.
    #[arg(long)]
    pub before: Option<NaiveDate>,

    /// Write the ordered batch here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Also upsert the ranked batch into this database.
    #[arg(long)]
    pub db_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/runsheet/clerk.db")]
    pub db_path: PathBuf,
}
