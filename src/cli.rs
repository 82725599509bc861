use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "shelfmark")]
#[command(author, version, about = "Browse a library catalog and track which books are lent out", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true, env = "SHELFMARK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Run the command without changing lending state
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// More log output (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show every book with its loan status, then the available and
    /// borrowed lists
    Catalog,
    /// Show one entity with its references resolved
    View {
        /// Document the entity lives in, e.g. `authors.xml`
        #[arg(short, long)]
        file: String,
        #[arg(short, long)]
        id: String,
    },
    /// Lend a book
    Borrow {
        #[arg(short, long)]
        book: String,
        #[arg(long)]
        borrower: String,
        /// Borrow date as YYYY-MM-DD
        #[arg(short, long)]
        date: String,
    },
    /// Take a book back
    Return {
        #[arg(short, long)]
        book: String,
        /// Return date as YYYY-MM-DD
        #[arg(short, long)]
        date: String,
    },
    /// Forget every loan
    Clear,
    /// Write the catalog and every entity page as a static HTML site
    Export {
        /// Output directory, created if missing
        dir: PathBuf,
    },
}

impl Cli {
    /// Log filter used when `RUST_LOG` isn't set.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
