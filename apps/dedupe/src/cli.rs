//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};
use saleguard_core::{Confidence, GroupSelection};

/// Report file written when `--report` is given without a path.
pub const DEFAULT_REPORT_FILE: &str = "relatorio-duplicatas.txt";

#[derive(Debug, Parser)]
#[command(
    name = "dedupe",
    about = env!("CARGO_PKG_DESCRIPTION"),
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "(Optional) Settings file. Defaults to saleguard.toml when present."
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "(Optional) SQLite database path, overriding the settings."
    )]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Detect duplicate sales and print a summary.
    Scan(ScanArgs),
    /// Delete the duplicates of selected groups, then scan again.
    Purge(PurgeArgs),
    /// Load a feed export (products and sales) into the database.
    Import(ImportArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct ScanArgs {
    #[arg(
        long,
        value_name = "PATH",
        num_args = 0..=1,
        default_missing_value = DEFAULT_REPORT_FILE,
        help = "(Optional) Writes the plain-text report to PATH."
    )]
    pub report: Option<PathBuf>,

    #[arg(long, help = "Prints the detection result as JSON instead of a summary.")]
    pub json: bool,
}

#[derive(Debug, Clone, Default, Args)]
#[command(group(
    ArgGroup::new("selection")
        .required(true)
        .args(["all", "group", "min_confidence"])
))]
pub struct PurgeArgs {
    #[arg(long, help = "Selects every group.")]
    pub all: bool,

    #[arg(
        long,
        value_name = "N",
        num_args = 1..,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Selects groups by their number in the summary (1-based)."
    )]
    pub group: Vec<u64>,

    #[arg(
        long,
        value_name = "LEVEL",
        help = "Selects groups at or above high, medium or low confidence."
    )]
    pub min_confidence: Option<Confidence>,

    #[arg(long, help = "Deletes for real. Without it only the plan is printed.")]
    pub yes: bool,
}

impl PurgeArgs {
    /// The operator's choice as a zero-based selection.
    pub fn selection(&self) -> GroupSelection {
        if let Some(level) = self.min_confidence {
            GroupSelection::MinConfidence(level)
        } else if !self.group.is_empty() {
            GroupSelection::Indices(
                self.group
                    .iter()
                    .map(|number| (number - 1) as usize)
                    .collect(),
            )
        } else {
            GroupSelection::All
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// JSON file: an array of sales, or an object with `products` and `sales`.
    pub file: PathBuf,
}

// =============================================================================
// Unit Tests
// =============================================================================
