//! Compounder CLI
//!
//! Run with:
//!   cargo run -- simulate --scenario scenarios/cake_bnb.toml
//!   cargo run -- inspect --config strategy.toml

use std::path::PathBuf;

use alloy_primitives::U256;
use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use console::style;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use compounder::rpc::RpcObserver;
use compounder::scenario::ScenarioConfig;
use compounder::{HarvestLog, HarvestReport, ProfitEstimate, StrategyConfig};

#[derive(Parser)]
#[command(name = "compounder", version, about = "Auto-compounding LP strategy")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run harvest rounds against an in-memory chain
    Simulate {
        /// Scenario file (TOML)
        #[arg(long)]
        scenario: PathBuf,

        /// Override the scenario's number of rounds
        #[arg(long)]
        rounds: Option<u32>,

        /// Append every harvest to this JSON-lines file
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Read live holdings and pending profit of a deployed strategy
    Inspect {
        /// Strategy config (TOML); environment variables if omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!(
        "{}",
        style(" 🌾 COMPOUNDER - Auto-compounding LP Strategy").cyan().bold()
    );
    println!(
        "{}",
        style("    Claim | Charge Fees | Add Liquidity | Restake").cyan()
    );
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

fn print_estimate(estimate: &ProfitEstimate) {
    println!("   Gross:          {}", estimate.gross);
    println!("   Fees:           {}", estimate.total_fee);
    println!("   Net:            {}", estimate.net);
    println!("   Caller reward:  {}", estimate.caller_reward);
}

fn print_round(round: u32, report: &HarvestReport) {
    println!(
        "{} Round {}: claimed {} reward, +{} want, tvl {}",
        style("✓").green(),
        round,
        report.reward_claimed,
        report.want_harvested,
        report.tvl
    );
    println!(
        "   Fees → caller {} | treasury {} | strategist {}",
        report.fee_split.call_fee, report.fee_split.treasury_fee, report.fee_split.strategist_fee
    );
}

fn harvest_log(report: &HarvestReport) -> HarvestLog {
    HarvestLog {
        timestamp: Utc::now(),
        harvester: report.harvester.to_string(),
        reward_claimed: report.reward_claimed.to_string(),
        call_fee: report.fee_split.call_fee.to_string(),
        treasury_fee: report.fee_split.treasury_fee.to_string(),
        strategist_fee: report.fee_split.strategist_fee.to_string(),
        want_harvested: report.want_harvested.to_string(),
        tvl: report.tvl.to_string(),
    }
}

fn simulate(scenario_path: PathBuf, rounds: Option<u32>, log: Option<PathBuf>) -> Result<()> {
    let scenario = ScenarioConfig::from_file(&scenario_path)?;
    scenario.strategy.print_summary();
    println!();

    println!("{}", style("═══ SETUP ═══").blue().bold());
    let (mut chain, mut strategy) = scenario.prepare()?;
    let start_tvl = strategy.total_held(&chain)?;
    let pair = strategy.underlying();
    println!(
        "{} Want {} = {} / {}",
        style("✓").green(),
        strategy.want(),
        scenario.symbol_of(pair.asset0),
        scenario.symbol_of(pair.asset1)
    );
    println!(
        "{} Fees settle in {}",
        style("✓").green(),
        scenario.symbol_of(strategy.fee_asset())
    );
    println!("{} Staked {} want", style("✓").green(), start_tvl);
    println!();

    println!("{}", style("═══ HARVESTS ═══").green().bold());
    let rounds = rounds.unwrap_or(scenario.rounds);
    let mut caller_earned = U256::ZERO;
    for round in 1..=rounds {
        chain.advance_time(scenario.interval_secs);

        let estimate = strategy.estimate_pending_profit(&chain)?;
        info!("Round {}: {} pending (caller {})", round, estimate.gross, estimate.caller_reward);

        match strategy.harvest(&mut chain, scenario.harvester) {
            Ok(report) => {
                print_round(round, &report);
                caller_earned += report.fee_split.call_fee;
                if let Some(path) = &log {
                    if let Err(e) = harvest_log(&report).append_to_file(path) {
                        warn!("Failed to append harvest log: {}", e);
                    }
                }
            }
            Err(e) => {
                error!("Harvest round {} failed: {}", round, e);
                println!("{} Round {}: {}", style("✗").red(), round, e);
            }
        }
    }
    println!();

    println!("{}", style("═══ SUMMARY ═══").magenta().bold());
    let holdings = strategy.holdings(&chain)?;
    let end_tvl = holdings.total_held()?;
    println!("   Start tvl:      {}", start_tvl);
    println!("   End tvl:        {}", end_tvl);
    println!("   Compounded:     {}", end_tvl.saturating_sub(start_tvl));
    println!("   Caller earned:  {} {}", caller_earned, scenario.symbol_of(strategy.fee_asset()));
    println!("   Idle reward:    {}", holdings.idle_reward);
    if let Some(ts) = strategy.last_harvest() {
        println!("   Last harvest:   {}", ts);
    }
    println!();
    println!("{}", style("Pending profit right now:").magenta());
    print_estimate(&strategy.estimate_pending_profit(&chain)?);

    Ok(())
}

async fn inspect(config_path: Option<PathBuf>) -> Result<()> {
    let config = match config_path {
        Some(path) => StrategyConfig::from_file(path)?,
        None => StrategyConfig::from_env()?,
    };
    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(e.into());
    }
    config.print_summary();
    println!();

    let rpc_url = std::env::var("RPC_URL").map_err(|_| eyre!("RPC_URL is not set"))?;
    let observer = RpcObserver::new(rpc_url, config)?;

    let holdings = observer.holdings().await?;
    println!("{}", style("═══ LIVE HOLDINGS ═══").blue().bold());
    println!("   Idle want:      {}", holdings.idle_want);
    println!("   Staked want:    {}", holdings.staked_want);
    println!("   Total held:     {}", holdings.total_held()?);
    println!("   Pending reward: {}", holdings.pending_reward);
    println!();

    println!("{}", style("═══ PENDING PROFIT ═══").magenta().bold());
    print_estimate(&observer.estimate_pending_profit().await?);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("compounder=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    print_banner();

    match cli.command {
        Command::Simulate { scenario, rounds, log } => simulate(scenario, rounds, log),
        Command::Inspect { config } => inspect(config).await,
    }
}
