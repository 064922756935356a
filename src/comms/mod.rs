//! Comms subsystem — external I/O channels.
//!
//! Telegram is the only channel today, but the layout keeps room for more:
//! each channel captures the shared [`Arc<BotState>`] at construction and
//! runs as an independent task watching the shutdown token.

pub mod format;
pub mod state;
pub mod telegram;

pub use state::BotState;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::error::AppError;

/// Spawn the configured channels and return a handle that resolves when
/// they have all exited.
///
/// Synchronous — returns as soon as the tasks are spawned. The caller
/// decides when (or whether) to await the handle.
pub fn start(
    config: &Config,
    state: Arc<BotState>,
    shutdown: CancellationToken,
) -> JoinHandle<Result<(), AppError>> {
    if config.telegram.enabled {
        info!("loading telegram channel");
        tokio::spawn(telegram::run("telegram0".to_string(), state, shutdown))
    } else {
        info!("no comms channels enabled — waiting for shutdown");
        tokio::spawn(async move {
            shutdown.cancelled().await;
            Ok(())
        })
    }
}
