//! Expense bot — entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config (DATA_DIR / LOG_LEVEL env overrides)
//!   3. Init logger
//!   4. Ensure the data directory and open the store
//!   5. Spawn Ctrl-C → shutdown signal watcher
//!   6. Run comms channels until shutdown

use std::fs;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use expense_bot::comms::{self, BotState};
use expense_bot::config;
use expense_bot::error::AppError;
use expense_bot::ledger::ExpenseStore;
use expense_bot::logger;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let config = config::load()?;
    logger::parse_level(&config.log_level)?;
    logger::init(&config.log_level)?;

    info!(
        bot_name = %config.bot_name,
        data_dir = %config.data_dir.display(),
        log_level = %config.log_level,
        "config loaded"
    );

    fs::create_dir_all(&config.data_dir)
        .map_err(|e| AppError::Config(format!("cannot create data dir {}: {e}", config.data_dir.display())))?;

    let store = ExpenseStore::open(&config.db_path())?;
    info!(db = %config.db_path().display(), "store ready");

    let state = Arc::new(BotState::new(store, &config));

    // Shared shutdown token — Ctrl-C cancels it, all tasks watch it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    let comms_handle = comms::start(&config, state, shutdown);

    info!("✅ Bot started successfully.");

    match comms_handle.await {
        Ok(r) => r,
        Err(e) => Err(AppError::Comms(format!("comms task panicked: {e}"))),
    }
}
