use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wca")]
#[command(
    version,
    about = "Wind Claim Assessor - Aggregate photo evidence for wind-damage claims",
    long_about = "Wind Claim Assessor (WCA)\n\nModes:\n- assess: download the claim photos, collapse near-duplicates, classify one representative per group, and emit a per-area damage assessment.\n- validate: check a claim request payload without fetching anything.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) to set defaults for concurrency/thresholds/vision; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full assessment pipeline for a claim
    Assess {
        #[arg(
            long,
            value_name = "PATH",
            help = "Claim request JSON file (reads stdin if omitted)"
        )]
        input: Option<PathBuf>,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(
            long,
            help = "Max concurrent fetch/classification tasks (overrides config)"
        )]
        concurrency: Option<usize>,
    },
    /// Validate a claim request without running the pipeline
    Validate {
        #[arg(
            long,
            value_name = "PATH",
            help = "Claim request JSON file (reads stdin if omitted)"
        )]
        input: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON on a single line
    Json,
    /// Indented JSON for human reading
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}
