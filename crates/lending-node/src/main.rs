//! # Lending Node
//!
//! Command-line entry point for the lending ledger.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `namehash` | Print the node hash of a name |
//! | `repayment` | Print principal plus simple interest |
//! | `verify-name` | Check a name resolves to an owner over JSON-RPC |
//! | `check-eligibility` | Check an account against the balance and code gate |
//! | `demo` | Run an in-memory ledger with a decision worker |
//!
//! Configuration comes from `LENDING_*` environment variables; flags override
//! them. `RUST_LOG` controls the log filter.

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lending_ledger::prelude::*;
use lending_oracle::prelude::*;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::{load_config, parse_address, NodeConfig};

#[derive(Parser, Debug)]
#[command(name = "lending-node")]
#[command(about = "Loan request ledger with name-backed identity checks")]
#[command(version)]
struct Cli {
    /// JSON-RPC endpoint URL
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Name registry contract address
    #[arg(long, global = true)]
    registry: Option<String>,

    /// Oracle identity address
    #[arg(long, global = true)]
    oracle: Option<String>,

    /// Enable the debug request entry point
    #[arg(long, global = true)]
    enable_debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the node hash of a dotted name
    Namehash {
        /// Name to hash, e.g. alice.eth
        name: String,
    },
    /// Print the total repayment for a principal and rate
    Repayment {
        /// Principal in wei (decimal)
        principal: String,
        /// Interest rate in basis points
        rate_bps: u64,
    },
    /// Check that a name resolves to the claimed owner
    VerifyName {
        /// Name to verify
        name: String,
        /// Address the name must resolve to
        owner: String,
    },
    /// Check an account against the borrowing gate
    CheckEligibility {
        /// Account to check
        account: String,
    },
    /// Run an in-memory ledger with a decision worker
    Demo,
}

impl Cli {
    fn apply(&self, config: &mut NodeConfig) -> Result<()> {
        if let Some(url) = &self.rpc_url {
            config.rpc.url.clone_from(url);
        }
        if let Some(registry) = &self.registry {
            config.rpc.registry = parse_address("--registry", registry)?;
        }
        if let Some(oracle) = &self.oracle {
            config.set_oracle(parse_address("--oracle", oracle)?);
        }
        if self.enable_debug {
            config.ledger.debug_entrypoints = true;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let mut config = load_config()?;
    cli.apply(&mut config)?;

    match cli.command {
        Command::Namehash { name } => {
            println!("{}", namehash(&name));
        }
        Command::Repayment {
            principal,
            rate_bps,
        } => {
            let principal = U256::from_dec_str(&principal)
                .map_err(|e| anyhow::anyhow!("invalid principal {principal:?}: {e:?}"))?;
            println!("{}", total_repayment(principal, rate_bps)?);
        }
        Command::VerifyName { name, owner } => {
            let owner = parse_address("owner", &owner)?;
            let adapter = Arc::new(EthRpcAdapter::new(&config.rpc)?);
            IdentityValidator::new(adapter).validate(&name, owner).await?;
            println!("{name} resolves to {owner}");
        }
        Command::CheckEligibility { account } => {
            let account = parse_address("account", &account)?;
            let adapter = Arc::new(EthRpcAdapter::new(&config.rpc)?);
            let snapshot = adapter.snapshot(account).await?;
            info!(
                %account,
                balance = %snapshot.balance,
                has_code = snapshot.has_code,
                "Account snapshot"
            );
            EligibilityGate::new(adapter).check(account).await?;
            println!("{account} is eligible");
        }
        Command::Demo => {
            run_demo(config).await?;
        }
    }

    Ok(())
}

const DEMO_ORACLE: Address = Address::new([0x0A; 20]);
const ALICE: Address = Address::new([0xA1; 20]);
const BOB: Address = Address::new([0xB0; 20]);
const CAROL: Address = Address::new([0xC0; 20]);
const RESOLVER: Address = Address::new([0x5E; 20]);

/// Run a ledger and a worker in-process and print every event as JSON.
///
/// The debug request for carol.eth is only issued when debug entry points
/// are enabled. Returns the final records of the decided requests.
async fn run_demo(mut config: NodeConfig) -> Result<Vec<LoanRequest>> {
    if config.ledger.oracle.is_zero() {
        config.set_oracle(DEMO_ORACLE);
    }
    if let Err(err) = config.ledger.validate_for_production() {
        warn!(reason = %err, "Ledger configuration is not production-ready");
    }

    let ledger = Arc::new(create_test_service(config.ledger.clone()));

    // alice.eth: linked, social record, 10 ETH.
    let alice = ledger.names().register("alice.eth", RESOLVER, ALICE);
    ledger.names().set_text(RESOLVER, alice, "com.github", "alice");
    ledger.accounts().set_balance(ALICE, U256::exp10(19));
    // bob: no name, 0.1 ETH.
    ledger.accounts().set_balance(BOB, U256::exp10(17));
    // carol.eth: linked, empty wallet; only the debug path can reach her.
    ledger.names().register("carol.eth", RESOLVER, CAROL);

    let decider = SignalDecider::new(
        Arc::clone(ledger.names()),
        Arc::clone(ledger.accounts()),
        config.worker.default_rate_bps,
    );
    let worker = Arc::new(OracleWorker::new(
        Arc::clone(&ledger),
        decider,
        config.worker.clone(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_handle = {
        let worker = Arc::clone(&worker);
        let subscription = ledger.subscribe(config.worker.start_cursor, EventFilter::new_requests());
        tokio::spawn(async move { worker.run(subscription, shutdown_rx).await })
    };

    let mut printer = ledger.subscribe(0, EventFilter::all());

    let mut pending = Vec::new();
    pending.push(
        ledger
            .request_loan(ALICE, "alice.eth", U256::exp10(18))
            .await?,
    );
    pending.push(ledger.request_loan(BOB, "", U256::exp10(16)).await?);
    if config.ledger.debug_entrypoints {
        pending.push(
            ledger
                .debug_request_loan_with_balance(
                    config.ledger.oracle,
                    CAROL,
                    "carol.eth",
                    U256::exp10(18),
                    U256::exp10(18) * U256::from(2),
                )
                .await?,
        );
    } else {
        info!("Debug entry points disabled; skipping simulated-balance request");
    }

    if let Err(err) = ledger.request_loan(CAROL, "carol.eth", U256::exp10(18)).await {
        warn!(borrower = %CAROL, reason = %err, "Request refused");
    }

    let mut decided = 0;
    while decided < pending.len() {
        let Ok(Some(entry)) = tokio::time::timeout(Duration::from_secs(5), printer.recv()).await
        else {
            bail!("timed out waiting for decisions");
        };
        if entry.event.kind() == EventKind::Processed {
            decided += 1;
        }
        println!(
            "{}",
            serde_json::to_string(&entry).context("serializing event")?
        );
    }
    // An approval's Executed event lands in the same batch as its Processed.
    while let Some(entry) = printer.try_recv() {
        println!(
            "{}",
            serde_json::to_string(&entry).context("serializing event")?
        );
    }

    shutdown_tx.send(true)?;
    let cursor = worker_handle.await?;

    let mut records = Vec::with_capacity(pending.len());
    for id in &pending {
        let request = ledger.get_loan_request(*id).await?;
        println!("{}", serde_json::to_string(&request)?);
        records.push(request);
    }

    info!(cursor, ledger = ?ledger.stats(), worker = ?worker.stats(), "Demo finished");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_config(debug_entrypoints: bool) -> NodeConfig {
        let mut config = NodeConfig::default();
        config.ledger.debug_entrypoints = debug_entrypoints;
        config
    }

    #[test]
    fn test_enable_debug_flag_overrides_config() {
        let cli = Cli::try_parse_from(["lending-node", "--enable-debug", "demo"]).unwrap();
        let mut config = NodeConfig::default();
        cli.apply(&mut config).unwrap();
        assert!(config.ledger.debug_entrypoints);

        let cli = Cli::try_parse_from(["lending-node", "demo"]).unwrap();
        let mut config = NodeConfig::default();
        cli.apply(&mut config).unwrap();
        assert!(!config.ledger.debug_entrypoints);
    }

    #[tokio::test]
    async fn test_demo_skips_debug_request_when_disabled() {
        let records = run_demo(demo_config(false)).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.processed));
        assert!(records.iter().all(|r| r.borrower != CAROL));
    }

    #[tokio::test]
    async fn test_demo_runs_debug_request_when_enabled() {
        let records = run_demo(demo_config(true)).await.unwrap();
        assert_eq!(records.len(), 3);
        let carol = records.iter().find(|r| r.borrower == CAROL).unwrap();
        assert!(carol.processed);
        assert!(carol.approved);
    }
}
