//! SHIELD command line: report scam addresses and vote on reports.

use std::path::PathBuf;
use std::sync::Arc;

use alloy_primitives::U256;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde_json::json;
use shield_governance::{GovernanceConfig, GovernanceEngine, PendingTransaction};
use shield_rpc::HttpProvider;
use shield_types::{Proposal, TokenAmount};
use shield_utils::LogFormat;

#[derive(Parser)]
#[command(name = "shield", about = "Community scam reporting with quadratic voting")]
struct Cli {
    /// JSON-RPC endpoint of a node or wallet that holds the signer's key.
    #[arg(long, env = "SHIELD_RPC_URL")]
    rpc_url: Option<String>,

    /// Account that signs proposals and votes.
    #[arg(long, env = "SHIELD_ACCOUNT")]
    account: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "SHIELD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "SHIELD_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Side {
    For,
    Against,
}

#[derive(clap::Subcommand)]
enum Command {
    /// File a scam report against an address or ENS name.
    Report {
        address: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        evidence: String,
        /// Block until the transaction has this many confirmations.
        #[arg(long)]
        wait: Option<u64>,
    },
    /// Stake tokens for or against a report. Approves the spend first if needed.
    Vote {
        proposal_id: U256,
        side: Side,
        /// Amount in whole tokens, e.g. "10" or "2.5".
        tokens: String,
        #[arg(long)]
        wait: Option<u64>,
    },
    /// Settle a report.
    Execute {
        proposal_id: U256,
        #[arg(long)]
        wait: Option<u64>,
    },
    /// List every report with its current tallies.
    Proposals,
    /// List the reports filed by the configured account.
    MyReports,
    /// Show one report.
    Proposal { proposal_id: U256 },
    /// Show how an account voted on a report.
    VoteInfo { proposal_id: U256, voter: String },
    /// Scam likelihood of an address, 0 to 100.
    Score { address: String },
    /// Every vote an account has cast.
    Votes { address: String },
    /// How often an account voted with the final outcome.
    Accuracy { address: String },
    /// Whether an address has been flagged by an executed report.
    IsScammer { address: String },
    /// SHIELD token balance and governance allowance of an account.
    Balance { address: Option<String> },
    /// Check that the governance contract answers on the current chain.
    Verify,
    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(cli: &Cli) -> anyhow::Result<GovernanceConfig> {
    let mut config = match &cli.config {
        Some(path) => GovernanceConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GovernanceConfig::default(),
    };
    config.apply_env();
    if let Some(url) = &cli.rpc_url {
        config.rpc_url = url.clone();
    }
    if let Some(account) = &cli.account {
        config.account = Some(account.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    Ok(config)
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_proposals(proposals: &[Proposal]) -> anyhow::Result<()> {
    let rows: Vec<_> = proposals
        .iter()
        .map(|p| json!({ "proposal": p, "status": p.status() }))
        .collect();
    print_json(&rows)
}

async fn finish<P: shield_rpc::ChainProvider>(
    pending: PendingTransaction<P>,
    wait: Option<u64>,
) -> anyhow::Result<()> {
    match wait {
        Some(confirmations) => {
            let receipt = pending.wait(confirmations).await?;
            print_json(&json!({
                "tx": pending.hash(),
                "block": receipt.block_number,
                "gas_used": receipt.gas_used,
            }))
        }
        None => print_json(&json!({ "tx": pending.hash() })),
    }
}

async fn run(
    engine: &GovernanceEngine<HttpProvider>,
    config: &GovernanceConfig,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Report {
            address,
            description,
            evidence,
            wait,
        } => {
            let pending = engine
                .submit_proposal(&address, &description, &evidence)
                .await?;
            finish(pending, wait).await
        }
        Command::Vote {
            proposal_id,
            side,
            tokens,
            wait,
        } => {
            let amount = TokenAmount::parse_units(&tokens, engine.token_decimals())?;
            let pending = engine
                .cast_vote(proposal_id, side == Side::For, amount)
                .await?;
            finish(pending, wait).await
        }
        Command::Execute { proposal_id, wait } => {
            let pending = engine.execute_proposal(proposal_id).await?;
            finish(pending, wait).await
        }
        Command::Proposals => print_proposals(&engine.try_list_proposals().await?),
        Command::MyReports => {
            engine.session().require_signer()?;
            print_proposals(&engine.user_reports().await?)
        }
        Command::Proposal { proposal_id } => {
            let proposal = engine.get_proposal(proposal_id).await?;
            print_json(&json!({ "proposal": &proposal, "status": proposal.status() }))
        }
        Command::VoteInfo { proposal_id, voter } => {
            let voter = engine.resolve(&voter).await?;
            print_json(&engine.get_vote(proposal_id, voter).await?)
        }
        Command::Score { address } => {
            let address = engine.resolve(&address).await?;
            let score = engine.assess(address).await;
            print_json(&json!({ "address": address, "score": score.score() }))
        }
        Command::Votes { address } => {
            let voter = engine.resolve(&address).await?;
            print_json(&engine.vote_history(voter).await?)
        }
        Command::Accuracy { address } => {
            let voter = engine.resolve(&address).await?;
            print_json(&engine.voting_accuracy(voter).await?)
        }
        Command::IsScammer { address } => {
            let flagged = engine.is_scam_address(&address).await?;
            print_json(&json!({ "address": address, "scammer": flagged }))
        }
        Command::Balance { address } => {
            let account = match address {
                Some(a) => engine.resolve(&a).await?,
                None => engine.session().require_signer()?,
            };
            let decimals = engine.token_decimals();
            let balance = engine.shield_balance(account).await?;
            let allowance = engine.token_allowance(account).await?;
            print_json(&json!({
                "account": account,
                "balance": balance.format_units(decimals),
                "allowance": allowance.format_units(decimals),
            }))
        }
        Command::Verify => {
            let ok = engine.verify_contract().await;
            print_json(&json!({ "verified": ok }))?;
            if !ok {
                anyhow::bail!("governance contract not reachable on the current chain");
            }
            Ok(())
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    shield_utils::init_tracing(config.log_format, &config.log_level);

    let provider = Arc::new(HttpProvider::with_timeout(
        config.rpc_url.clone(),
        config.request_timeout(),
    )?);
    let engine = GovernanceEngine::from_config(provider, &config)?;
    tracing::debug!(rpc = %config.rpc_url, signer = ?engine.session().signer(), "engine ready");

    let result = run(&engine, &config, cli.command).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "command failed");
    }
    engine.stats().log_summary();
    result
}
