use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "docdex",
    about = "Search schema-less JSON documents in memory"
)]
pub struct Cli {
    /// Document file to load (JSON array, single document, or JSON Lines)
    #[arg(short, long = "input", global = true)]
    pub inputs: Vec<PathBuf>,

    /// Engine settings as JSON
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Require every query token to match within one field
    #[arg(long, global = true)]
    pub match_all: bool,

    /// Match whole tokens only, no substrings
    #[arg(long, global = true)]
    pub exact: bool,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the loaded documents
    Search(SearchArgs),
    /// Show the number of stored documents
    Stats(StatsArgs),
    /// Dump a diagnostic snapshot of the stored documents
    Debug,
    /// List the searchable fields
    Fields(FieldsArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query
    pub query: String,

    /// Number of results to return (defaults to the configured limit)
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Stats --

#[derive(Debug, Parser)]
pub struct StatsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Fields --

#[derive(Debug, Parser)]
pub struct FieldsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "docdex",
            &mut std::io::stdout(),
        );
    }
}
