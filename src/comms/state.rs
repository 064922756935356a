//! Shared channel state — the ledger operations behind the Telegram surface.
//!
//! Channels capture an `Arc<BotState>` at construction. Every mutating
//! operation re-exports the full table to the Excel mirror before
//! returning, so the workbook on disk never lags the database by more than
//! an in-flight request. SQLite and workbook I/O are blocking, so each
//! operation runs on the blocking pool.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::error::AppError;
use crate::export::write_xlsx;
use crate::ledger::{CategoryTotal, Entry, ExpenseStore, ParsedEntry, Period};

/// State shared by all comms channels.
pub struct BotState {
    store: ExpenseStore,
    excel_path: PathBuf,
    /// Delay before ordinary bot replies are deleted from the chat.
    pub autodelete: Duration,
    /// Shorter delay for input-error hints.
    pub error_autodelete: Duration,
}

impl BotState {
    pub fn new(store: ExpenseStore, config: &Config) -> Self {
        Self {
            store,
            excel_path: config.excel_path(),
            autodelete: Duration::from_secs(config.telegram.autodelete_seconds),
            error_autodelete: Duration::from_secs(config.telegram.error_autodelete_seconds),
        }
    }

    /// Log a parsed expense. Returns the new entry id and the category's
    /// all-time total (which includes the new entry).
    pub async fn log_expense(&self, parsed: ParsedEntry, user: String) -> Result<(i64, f64), AppError> {
        let store = self.store.clone();
        let excel_path = self.excel_path.clone();
        run_blocking(move || {
            let id = store.insert(&parsed.category, parsed.amount, &parsed.note, &user)?;
            write_xlsx(&excel_path, &store.all_entries()?)?;
            let sum = store.category_sum(&parsed.category)?;
            Ok((id, sum))
        })
        .await
    }

    /// Per-category totals, optionally restricted to `period`.
    pub async fn totals(&self, period: Option<Period>) -> Result<Vec<CategoryTotal>, AppError> {
        let store = self.store.clone();
        run_blocking(move || match period {
            Some(p) => {
                let (start, end) = p.bounds();
                store.totals_by_category(Some((&start, &end)))
            }
            None => store.totals_by_category(None),
        })
        .await
    }

    /// All-time total and full entry listing for one category.
    pub async fn category_detail(&self, category: String) -> Result<(f64, Vec<Entry>), AppError> {
        let store = self.store.clone();
        run_blocking(move || {
            let total = store.category_sum(&category)?;
            let entries = store.category_entries(&category)?;
            Ok((total, entries))
        })
        .await
    }

    /// Delete one entry and refresh the mirror. `false` when the id was unknown.
    pub async fn delete_entry(&self, id: i64) -> Result<bool, AppError> {
        let store = self.store.clone();
        let excel_path = self.excel_path.clone();
        run_blocking(move || {
            let deleted = store.delete_entry(id)?;
            write_xlsx(&excel_path, &store.all_entries()?)?;
            Ok(deleted)
        })
        .await
    }

    /// Wipe the ledger and refresh the mirror.
    pub async fn clear_all(&self) -> Result<usize, AppError> {
        let store = self.store.clone();
        let excel_path = self.excel_path.clone();
        run_blocking(move || {
            let removed = store.clear()?;
            write_xlsx(&excel_path, &store.all_entries()?)?;
            Ok(removed)
        })
        .await
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Store(format!("blocking task panicked: {e}")))?
}
