use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use panther_sdk::{
    AnchorEvent, AnchorService, ClaimedProof, FileGuidelineLoader, FileHistoryStore,
    GuidelineFallback, GuidelineLoader, HistoryQuery, InMemoryHistoryStore, LedgerConfig,
    NoDefaultGuidelines, Proof, ProofBuilder, ProofHistoryStore, ProofService, SecretPolicy,
    SessionInput, Verification,
};
use panther_server::{ProofServer, ServerConfig};
use serde::de::DeserializeOwned;

use crate::cli::{Cli, Command, OutputFormat, SessionArgs};

pub fn run_command(cli: Cli) -> Result<ExitCode> {
    let format = cli.format;
    match cli.command {
        Command::Compute(args) => cmd_compute(&args.session, format),
        Command::Verify(args) => cmd_verify(&args.session, &args.proof, format),
        Command::History(args) => cmd_history(&args.log, args.hash, args.limit, format),
        Command::Serve(args) => cmd_serve(args.config.as_deref(), args.bind),
    }
}

fn cmd_compute(args: &SessionArgs, format: OutputFormat) -> Result<ExitCode> {
    let session: SessionInput = read_json(&args.input)?;
    let proof = offline_service(args)
        .compute_session(&session)
        .context("failed to compute proof")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&proof)?),
        OutputFormat::Text => print_proof(&proof),
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_verify(args: &SessionArgs, proof_path: &Path, format: OutputFormat) -> Result<ExitCode> {
    let session: SessionInput = read_json(&args.input)?;
    let claim: ClaimedProof = read_json(proof_path)?;
    let verification = offline_service(args)
        .verify_session(&session, &claim)
        .context("failed to recompute proof")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&verification)?),
        OutputFormat::Text => print_verification(&verification),
    }
    Ok(if verification.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn cmd_history(
    log: &Path,
    hash: Option<String>,
    limit: i64,
    format: OutputFormat,
) -> Result<ExitCode> {
    if !log.exists() {
        bail!("no history log at {}", log.display());
    }
    let events = FileHistoryStore::read_snapshot(log, &HistoryQuery::new(hash, limit))
        .with_context(|| format!("failed to read history log {}", log.display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&events)?),
        OutputFormat::Text => {
            if events.is_empty() {
                println!("{}", "No events.".yellow());
            }
            for event in &events {
                println!("{}", format_event(event));
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_serve(config: Option<&Path>, bind: Option<std::net::SocketAddr>) -> Result<ExitCode> {
    let mut config = match config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ServerConfig::default(),
    };
    config.apply_env()?;
    if let Some(addr) = bind {
        config.bind_addr = addr;
    }

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(ProofServer::new(config).serve())?;
    Ok(ExitCode::SUCCESS)
}

/// Service for one-shot compute/verify: no ledger, throwaway history.
///
/// An explicit guideline file must load; without one the empty list stands
/// in for the default document.
fn offline_service(args: &SessionArgs) -> ProofService {
    let (loader, fallback): (Arc<dyn GuidelineLoader>, _) = match &args.guidelines {
        Some(path) => (
            Arc::new(FileGuidelineLoader::new(path)),
            GuidelineFallback::Fail,
        ),
        None => (Arc::new(NoDefaultGuidelines), GuidelineFallback::EmptyList),
    };
    let policy = if args.redact_secrets {
        SecretPolicy::Redact
    } else {
        SecretPolicy::Bind
    };
    let builder = ProofBuilder::new(loader)
        .with_fallback(fallback)
        .with_secret_policy(policy);
    let history: Arc<dyn ProofHistoryStore> = Arc::new(InMemoryHistoryStore::new());
    ProofService::new(builder, AnchorService::new(LedgerConfig::default(), history))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn print_proof(proof: &Proof) {
    println!("{} {}", "✓".green().bold(), proof.scheme.bold());
    println!("  combined:   {}", proof.combined_hash.to_hex().cyan());
    println!("  input:      {}", proof.input_hash);
    println!("  results:    {}", proof.results_hash);
    println!("  providers:  {}", proof.providers_hash);
    println!("  guidelines: {}", proof.guidelines_hash);
    println!("  salted:     {}", proof.salt_present);
    println!("  timestamp:  {}", proof.timestamp_ms);
}

fn print_verification(verification: &Verification) {
    if verification.valid {
        println!("{} proof is valid", "✓".green().bold());
        return;
    }
    println!("{} proof is invalid", "✗".red().bold());
    for field in &verification.mismatched {
        println!("  mismatch: {}", field.yellow());
    }
}

fn format_event(event: &AnchorEvent) -> String {
    let detail = match (&event.tx_hash, event.anchored) {
        (Some(tx), _) => format!("tx {tx}"),
        (None, Some(true)) => "anchored".to_string(),
        (None, Some(false)) => "pending".to_string(),
        (None, None) => String::new(),
    };
    format!(
        "{} {:<6} {} {}",
        event.ts,
        event.action.to_string().cyan(),
        short(&event.hash),
        detail
    )
}

fn short(hash: &str) -> &str {
    hash.get(..16).unwrap_or(hash)
}
