use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "panther-proof",
    about = "Panther proofs: compute, verify and inspect validation-session commitments",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the proof for a session file
    Compute(ComputeArgs),
    /// Check a proof against a session file
    Verify(VerifyArgs),
    /// Show anchor/status events from a history log
    History(HistoryArgs),
    /// Start the proof HTTP server
    Serve(ServeArgs),
}

/// Options shared by `compute` and `verify`.
#[derive(Args)]
pub struct SessionArgs {
    /// Session JSON: {prompt, providers, results, guidelines_json?, salt?}
    #[arg(short, long)]
    pub input: PathBuf,

    /// Default guideline file, used when the session has no guidelines_json
    #[arg(short, long)]
    pub guidelines: Option<PathBuf>,

    /// Leave provider api keys out of the commitment
    #[arg(long)]
    pub redact_secrets: bool,
}

#[derive(Args)]
pub struct ComputeArgs {
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Proof JSON to check (only combined_hash is required)
    #[arg(short, long)]
    pub proof: PathBuf,
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Durable history log written by the server
    #[arg(long)]
    pub log: PathBuf,

    /// Only events for this hash
    #[arg(long)]
    pub hash: Option<String>,

    /// Maximum events (clamped to 0..=1000)
    #[arg(short = 'n', long, default_value_t = 100, allow_negative_numbers = true)]
    pub limit: i64,
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen address, overriding config and environment
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,
}
