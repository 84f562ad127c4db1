mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand, ValueEnum};
use docfind_core::matching::MatchType;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "dfind", version, about = "Find text inside indexed content items")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seconds to wait for the index to finish building
    #[arg(long, global = true, default_value_t = 60)]
    wait_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and print resolved settings
    Doctor,

    /// Search every configured source for matching content
    Find(FindArgs),

    /// Print every match inside one item extension
    Highlights(HighlightsArgs),

    /// Rebuild the index from every configured source
    Reindex,

    /// Build the index and report its state
    Status,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Quiet,
}

#[derive(Debug, Args)]
pub struct MatchArgs {
    /// Pattern to search for; `tag:<value>` tokens require that tag
    pub pattern: String,

    /// How the pattern is compared (contains, equals, regex, chars_anywhere, ...)
    #[arg(long = "match", default_value = "contains", value_parser = parse_match_type)]
    pub match_type: MatchType,

    #[arg(long)]
    pub case_sensitive: bool,
}

#[derive(Debug, Args)]
pub struct FindArgs {
    #[command(flatten)]
    pub matching: MatchArgs,

    /// Required tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    #[arg(long, default_value_t = 100)]
    pub length: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Shorthand for --output json
    #[arg(long)]
    pub json: bool,

    /// Shorthand for --output quiet
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug, Args)]
pub struct HighlightsArgs {
    #[command(flatten)]
    pub matching: MatchArgs,

    /// Content type of the item
    #[arg(long = "type")]
    pub content_type: String,

    #[arg(long)]
    pub uuid: String,

    #[arg(long)]
    pub extension: String,

    #[arg(long)]
    pub json: bool,
}

fn parse_match_type(s: &str) -> Result<MatchType, String> {
    MatchType::from_str(s).ok_or_else(|| {
        let known: Vec<&str> = MatchType::ALL.iter().map(MatchType::as_str).collect();
        format!("unknown match type '{}' (expected one of: {})", s, known.join(", "))
    })
}

fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Doctor => cmd::doctor::run(config),
        Commands::Find(args) => cmd::find::run(config, cli.wait_secs, args),
        Commands::Highlights(args) => cmd::highlights::run(config, cli.wait_secs, args),
        Commands::Reindex => cmd::reindex::run(config, cli.wait_secs),
        Commands::Status => cmd::status::run(config, cli.wait_secs),
    }
}
