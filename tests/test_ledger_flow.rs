//! End-to-end ledger flow: parse → log → summarize → detail → delete → clear,
//! with the Excel mirror tracking every mutation.

use std::sync::Arc;

use tempfile::TempDir;

use expense_bot::comms::BotState;
use expense_bot::config::{Config, StorageConfig, TelegramConfig};
use expense_bot::ledger::{parse_entry, ExpenseStore};

fn setup() -> (TempDir, Arc<BotState>) {
    let tmp = TempDir::new().expect("tempdir");
    let config = Config {
        bot_name: "test".into(),
        data_dir: tmp.path().to_path_buf(),
        log_level: "info".into(),
        telegram: TelegramConfig {
            enabled: false,
            autodelete_seconds: 60,
            error_autodelete_seconds: 30,
        },
        storage: StorageConfig {
            db_file: "expenses.db".into(),
            excel_file: "expenses.xlsx".into(),
        },
    };
    let store = ExpenseStore::open(&config.db_path()).expect("open store");
    let state = Arc::new(BotState::new(store, &config));
    (tmp, state)
}

#[tokio::test]
async fn text_entry_round_trip() {
    let (tmp, state) = setup();

    let parsed = parse_entry("Food 25.50 Lunch with friends").unwrap();
    let (id, sum) = state.log_expense(parsed, "alice".into()).await.unwrap();
    assert_eq!(sum, 25.50);

    let (total, entries) = state.category_detail("food".into()).await.unwrap();
    assert_eq!(total, 25.50);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, id);
    assert_eq!(entries[0].note, "Lunch with friends");
    assert_eq!(entries[0].user, "alice");

    assert!(tmp.path().join("expenses.xlsx").exists());
}

#[tokio::test]
async fn totals_aggregate_across_categories() {
    let (_tmp, state) = setup();

    for text in ["Food 10", "Food 15 groceries", "Transport 40"] {
        state.log_expense(parse_entry(text).unwrap(), String::new()).await.unwrap();
    }

    let totals = state.totals(None).await.unwrap();
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].category, "transport");
    assert_eq!(totals[0].total, 40.0);
    assert_eq!(totals[1].total, 25.0);
}

#[tokio::test]
async fn delete_then_clear() {
    let (_tmp, state) = setup();

    let (id, _) = state
        .log_expense(parse_entry("Food 10").unwrap(), String::new())
        .await
        .unwrap();
    state.log_expense(parse_entry("Rent 900").unwrap(), String::new()).await.unwrap();

    assert!(state.delete_entry(id).await.unwrap());
    assert_eq!(state.totals(None).await.unwrap().len(), 1);

    assert_eq!(state.clear_all().await.unwrap(), 1);
    assert!(state.totals(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn mixed_case_categories_collapse() {
    let (_tmp, state) = setup();

    state.log_expense(parse_entry("FOOD 10").unwrap(), String::new()).await.unwrap();
    state.log_expense(parse_entry("food 5").unwrap(), String::new()).await.unwrap();

    let totals = state.totals(None).await.unwrap();
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].category, "food");
    assert_eq!(totals[0].total, 15.0);

    let (total, _) = state.category_detail("FoOd".into()).await.unwrap();
    assert_eq!(total, 15.0);
}
