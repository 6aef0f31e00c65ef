//! wallet-sweeper
//!
//! Consolidates native balances of generated EVM accounts into one
//! destination across several networks.
//!
//! # Architecture Overview
//!
//! ```text
//!   config (TOML + CLI) ──▶ registry ──▶ networks
//!   accounts (wallet file | env) ──────▶ accounts
//!                                            │
//!                                            ▼
//!   ┌──────────────────────── sweep::engine ─────────────────────────┐
//!   │  per network: connect (retry) ─▶ per account:                   │
//!   │     scanner (balance) ─▶ fees (cost) ─▶ executor (submit+wait)  │
//!   └────────────────────────────┬───────────────────────────────────┘
//!                                ▼
//!   report::aggregator ─▶ report::store (checkpoint, final JSON)
//!
//!   cross-cutting: observability, resilience, lifecycle (Ctrl-C)
//! ```

use alloy::primitives::utils::format_ether;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use wallet_sweeper::accounts::{env_key_report, AccountLoader};
use wallet_sweeper::blockchain::AlloyConnector;
use wallet_sweeper::config::{load_or_default, validate_config, validate_for_sweep, AccountSource, ConfigError};
use wallet_sweeper::lifecycle::{signals, Shutdown};
use wallet_sweeper::observability::{logging, metrics};
use wallet_sweeper::report::{render_summary, ReportStore};
use wallet_sweeper::sweep::{survey_balances, SweepEngine};
use wallet_sweeper::SweeperConfig;

#[derive(Parser)]
#[command(name = "wallet-sweeper")]
#[command(about = "Sweep native balances of generated wallets into one address", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep every account on every network into the destination
    Sweep {
        /// Destination address, overriding the config file
        #[arg(short, long)]
        destination: Option<String>,

        /// Read keys from environment variables instead of the wallet file
        #[arg(long)]
        from_env: bool,
    },
    /// Show balances on every network without moving funds
    Balances {
        #[arg(long)]
        from_env: bool,
    },
    /// List the configured networks
    Networks,
    /// Report which key and endpoint variables are set
    CheckEnv,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    logging::init(&config.observability);

    match cli.command {
        Commands::Sweep { destination, from_env } => {
            if let Some(destination) = destination {
                config.destination = Some(destination);
            }
            if from_env {
                config.accounts.source = AccountSource::Env;
            }
            sweep(config).await
        }
        Commands::Balances { from_env } => {
            if from_env {
                config.accounts.source = AccountSource::Env;
            }
            balances(config).await
        }
        Commands::Networks => {
            networks(&config);
            Ok(())
        }
        Commands::CheckEnv => {
            check_env(&config);
            Ok(())
        }
    }
}

async fn sweep(config: SweeperConfig) -> Result<(), Box<dyn std::error::Error>> {
    let destination = validate_for_sweep(&config).map_err(ConfigError::Validation)?;
    let accounts = AccountLoader::new(config.accounts.clone()).load()?;

    let prometheus = if config.observability.metrics_enabled {
        match metrics::install_prometheus() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(error = %e, "Metrics recorder unavailable");
                None
            }
        }
    } else {
        None
    };

    let shutdown = Shutdown::new();
    signals::spawn_ctrl_c_handler(shutdown.clone());

    let connector = Arc::new(AlloyConnector::new(Duration::from_secs(config.sweep.rpc_timeout_secs)));
    let engine = SweepEngine::new(connector, config.sweep.clone(), destination, shutdown);
    let store = ReportStore::new(&config.report.output_dir);

    let run = engine.run(&config.networks, &accounts, store.clone()).await?;

    if let Some(handle) = prometheus {
        match store.write_sidecar("prom", &handle.render()) {
            Ok(path) => tracing::info!(path = %path.display(), "Metrics snapshot written"),
            Err(e) => tracing::warn!(error = %e, "Metrics snapshot not written"),
        }
    }

    print!("{}", render_summary(&run.report));
    println!();
    println!("Report: {}", run.path.display());
    Ok(())
}

async fn balances(config: SweeperConfig) -> Result<(), Box<dyn std::error::Error>> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    let accounts = AccountLoader::new(config.accounts.clone()).load()?;
    let connector = AlloyConnector::new(Duration::from_secs(config.sweep.rpc_timeout_secs));

    let surveys = survey_balances(
        &connector,
        &config.networks,
        &accounts,
        config.sweep.max_concurrent_networks,
    )
    .await;

    for network in surveys {
        println!("{} ({})", network.network_name, network.currency);
        if let Some(error) = &network.connection_error {
            println!("  unreachable: {}", error);
            continue;
        }
        for entry in &network.balances {
            match &entry.balance {
                Ok(balance) if !balance.is_zero() => {
                    println!("  #{:<4} {}  {} {}", entry.wallet_id, entry.address, format_ether(*balance), network.currency)
                }
                Ok(_) => {}
                Err(e) => println!("  #{:<4} {}  error: {}", entry.wallet_id, entry.address, e),
            }
        }
        println!("  {} of {} wallets funded", network.funded(), network.balances.len());
    }
    Ok(())
}

fn networks(config: &SweeperConfig) {
    for (i, network) in config.networks.iter().enumerate() {
        let endpoint = match network.resolve_rpc_url() {
            Ok(url) => url,
            Err(e) => format!("unresolved ({})", e),
        };
        println!("{}. {} (chain {}, {})", i + 1, network.name, network.chain_id, network.currency);
        println!("   rpc:      {}", endpoint);
        if !network.failover_urls.is_empty() {
            println!("   failover: {}", network.failover_urls.len());
        }
        println!("   explorer: {}", network.explorer_url);
    }
}

fn check_env(config: &SweeperConfig) {
    let lookup = |name: &str| std::env::var(name).ok();

    println!("Private keys:");
    for status in env_key_report(&config.accounts.env_keys, lookup) {
        if status.present {
            println!("  {:<24} set ({} chars)", status.name, status.length);
        } else {
            println!("  {:<24} missing", status.name);
        }
    }

    println!("Endpoints:");
    for network in &config.networks {
        for (name, required) in network.env_vars() {
            let state = match (lookup(&name).is_some(), required) {
                (true, _) => "set",
                (false, true) => "missing (required)",
                (false, false) => "unset (using default)",
            };
            println!("  {:<24} {:<22} {}", name, state, network.name);
        }
    }

    match config.destination.as_deref() {
        Some(destination) => println!("Destination: {}", destination),
        None => println!("Destination: not configured"),
    }
}
