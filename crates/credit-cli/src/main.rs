//! Credit CLI
//!
//! Scores exported wallet activity and prints a JSON or text credit report.

mod report;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use credit_core::config::EngineConfig;
use credit_core::types::{FactorKind, StakingRecord};
use credit_core::ProtocolRegistry;
use credit_scorer::{CreditScorer, ImprovementPlan, ScoringWeights, WalletActivity};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Behavioral credit scoring for wallets.
#[derive(Parser)]
#[command(name = "credit-cli")]
#[command(version, about = "Score a wallet from its transaction history.")]
struct Cli {
    /// Protocol registry file (overrides CREDIT_REGISTRY_PATH).
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a wallet and print the full report.
    Score(ScoreArgs),
    /// Score a single factor.
    Factor(FactorArgs),
    /// Validate and summarize the protocol registry in use.
    Registry,
}

#[derive(Args)]
struct InputArgs {
    /// JSON array of raw transaction records.
    #[arg(short, long)]
    transactions: PathBuf,

    /// JSON array of staking records.
    #[arg(short, long)]
    staking: Option<PathBuf>,

    /// Current native balance in SOL.
    #[arg(short, long)]
    balance: Option<Decimal>,

    /// SOL to USD rate (overrides CREDIT_SOL_USD_RATE).
    #[arg(short, long)]
    rate: Option<Decimal>,

    /// Wallet address used to sign nested transfers (overrides CREDIT_WALLET_ADDRESS).
    #[arg(short, long)]
    wallet: Option<String>,

    /// Evaluation time as unix seconds (default: now).
    #[arg(long)]
    as_of: Option<i64>,
}

#[derive(Args)]
struct ScoreArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Report)]
    format: OutputFormat,

    /// Spread calculators over the thread pool.
    #[arg(long)]
    parallel: bool,
}

#[derive(Args)]
struct FactorArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Factor id, e.g. net_flow or wallet_age.
    #[arg(short, long)]
    name: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Report,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credit_cli=info,credit_scorer=info,credit_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = EngineConfig::from_env()?;
    if cli.registry.is_some() {
        config.registry_path = cli.registry.clone();
    }
    let registry = config.registry()?;

    match cli.command {
        Commands::Score(args) => score(&config, registry, args),
        Commands::Factor(args) => factor(&config, registry, args),
        Commands::Registry => describe_registry(&registry),
    }
}

fn score(config: &EngineConfig, registry: ProtocolRegistry, args: ScoreArgs) -> Result<()> {
    let (wallet, activity) = load_activity(config, &args.input)?;
    let scorer = CreditScorer::new(registry, ScoringWeights::default());

    let report = if args.parallel {
        scorer.score_parallel(&activity)
    } else {
        scorer.score(&activity)
    };
    let plan = ImprovementPlan::from_report(&report);

    info!(
        "Scored {} transactions: credit score {} ({})",
        activity.transactions.len(),
        report.aggregate.credit_score,
        report.aggregate.label
    );

    match args.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "wallet": wallet,
                "report": report,
                "plan": plan,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Report => {
            print!("{}", report::generate_report(wallet.as_deref(), &report, &plan));
        }
    }
    Ok(())
}

fn factor(config: &EngineConfig, registry: ProtocolRegistry, args: FactorArgs) -> Result<()> {
    let kind = FactorKind::ALL
        .iter()
        .copied()
        .find(|k| k.id() == args.name)
        .with_context(|| {
            let known: Vec<_> = FactorKind::ALL.iter().map(|k| k.id()).collect();
            format!("Unknown factor '{}'. Known factors: {}", args.name, known.join(", "))
        })?;

    let (_, activity) = load_activity(config, &args.input)?;
    let scorer = CreditScorer::new(registry, ScoringWeights::default());
    let Some(score) = scorer.score_factor(kind, &activity) else {
        bail!("No calculator registered for {}", kind);
    };

    println!("{}", serde_json::to_string_pretty(&score)?);
    Ok(())
}

fn describe_registry(registry: &ProtocolRegistry) -> Result<()> {
    registry.validate()?;
    println!("Registry version: {}", registry.version);
    println!("Lending protocols: {}", registry.lending_protocols.len());
    println!("Tool categories: {}", registry.tools.len());
    println!("Known validators: {}", registry.validators.len());
    println!(
        "Reputable validators: {}",
        registry.reputable_validators.join(", ")
    );
    Ok(())
}

fn load_activity(
    config: &EngineConfig,
    input: &InputArgs,
) -> Result<(Option<String>, WalletActivity)> {
    let values: Vec<Value> = read_json(&input.transactions)?;
    let wallet = input.wallet.clone().or_else(|| config.wallet_address.clone());
    let as_of = input.as_of.unwrap_or_else(|| chrono::Utc::now().timestamp());

    let mut activity = WalletActivity::from_raw(&values, wallet.as_deref(), as_of);
    info!(
        "Loaded {} of {} records from {}",
        activity.transactions.len(),
        values.len(),
        input.transactions.display()
    );

    if let Some(path) = &input.staking {
        let staking: Vec<StakingRecord> = read_json(path)?;
        activity = activity.with_staking(staking);
    }
    if let Some(balance) = input.balance {
        activity = activity.with_balance(balance);
    }
    if let Some(rate) = input.rate.or(config.sol_usd_rate) {
        activity = activity.with_rate(rate);
    }

    Ok((wallet, activity))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}
