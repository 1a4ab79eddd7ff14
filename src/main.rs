//! Payout Worker Binary
//!
//! Long-running withdrawal processor.
//!
//! Usage:
//!   payoutd [--interval <secs>] [--once]
//!
//! Configuration comes from the environment (see `config`); `--interval`
//! overrides the poll interval, `--once` runs a single cycle and exits.
//! Ctrl+C stops the loop after the in-flight request resolves.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use payout_worker::processor::{Converter, Pipeline, Poller, StatusUpdater, TransferExecutor};
use payout_worker::store::HttpRequestStore;
use payout_worker::units;
use payout_worker::{logging, Config, RpcLedgerClient, WorkerError};

#[derive(Debug, Default)]
struct Args {
    interval_secs: Option<u64>,
    once: bool,
}

fn parse_args(args: &[String]) -> Args {
    let mut parsed = Args::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--interval" if i + 1 < args.len() => {
                parsed.interval_secs = args[i + 1].parse().ok();
                i += 2;
            }
            "--once" => {
                parsed.once = true;
                i += 1;
            }
            "help" | "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            _ => i += 1,
        }
    }
    parsed
}

fn print_usage() {
    println!("payoutd - token withdrawal payout worker");
    println!();
    println!("Usage:");
    println!("  payoutd [--interval <secs>]    Run the poll loop");
    println!("  payoutd --once                 Run a single poll cycle and exit");
    println!();
    println!("Environment Variables:");
    println!("  STORE_URL             Request store base URL");
    println!("  STORE_SERVICE_KEY     Request store service credential");
    println!("  TREASURY_PRIVATE_KEY  Base58-encoded treasury keypair");
    println!("  SOLANA_RPC_URL        Ledger RPC endpoint");
    println!("  TOKEN_TO_SOL_RATE     Token to SOL conversion rate");
    println!("  MIN_WITHDRAWAL_SOL    Minimum payout in SOL");
    println!("  MAX_WITHDRAWAL_SOL    Maximum payout in SOL");
    println!("  POLL_INTERVAL_SECS    Seconds between store polls");
    println!("  LOG_LEVEL             debug, info, warn, error");
    println!("  LOG_JSON              1 for JSON log output");
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let argv: Vec<String> = env::args().collect();
    let args = parse_args(&argv[1..]);

    if let Err(e) = run(args).await {
        eprintln!("fatal: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), WorkerError> {
    let mut config = Config::from_env()?;
    if let Some(secs) = args.interval_secs {
        config.poll_interval_secs = secs;
        config.validate()?;
    }

    logging::init_from_config(&config)?;

    // Missing or invalid treasury credential is fatal before anything runs.
    let treasury = Arc::new(config.treasury_keypair()?);

    let store = Arc::new(HttpRequestStore::new(
        &config.store_url,
        &config.store_service_key,
    ));
    let ledger = Arc::new(RpcLedgerClient::new(&config.solana_rpc_url));

    let converter = Converter::from_config(&config);
    let executor = TransferExecutor::new(ledger, treasury);

    info!(
        treasury = %executor.treasury_pubkey(),
        rpc = %config.solana_rpc_url,
        rate = config.token_to_sol_rate,
        min_sol = config.min_withdrawal_sol,
        max_sol = config.max_withdrawal_sol,
        poll_interval_secs = config.poll_interval_secs,
        fee_reserve = %units::format_sol(payout_worker::processor::FEE_RESERVE_LAMPORTS),
        "starting payout worker"
    );

    let pipeline = Pipeline::new(converter, executor, StatusUpdater::new(store.clone()));
    let poller = Arc::new(Poller::new(
        store,
        pipeline,
        Duration::from_secs(config.poll_interval_secs),
    ));

    if args.once {
        let result = poller.run_cycle().await.map_err(WorkerError::Store)?;
        info!("[cycle] {}", result);
        return Ok(());
    }

    // Graceful shutdown: finish the in-flight request, then exit.
    {
        let poller = poller.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("shutdown signal received");
                    poller.stop().await;
                }
                Err(e) => error!(error = %e, "failed to listen for shutdown signal"),
            }
        });
    }

    poller.run().await;
    Ok(())
}
