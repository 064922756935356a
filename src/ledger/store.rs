//! `store` — SQLite persistence for expense entries.
//!
//! The store holds only the database path; every operation opens its own
//! connection with the recommended pragma set. This matches the access
//! pattern of the data it serves: short, infrequent, user-driven bursts.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use crate::error::AppError;
use crate::ledger::{CategoryTotal, Entry};
use crate::ledger::period::now_timestamp;

/// Schema version stored in `PRAGMA user_version`.
/// Increment when the DDL changes; add a migration path in `init_schema`.
const SCHEMA_VERSION: i64 = 1;

/// Expense entries persisted in a single SQLite file.
#[derive(Debug, Clone)]
pub struct ExpenseStore {
    db_path: PathBuf,
}

impl ExpenseStore {
    /// Open (creating if necessary) the database at `db_path` and ensure the
    /// schema exists.
    pub fn open(db_path: &Path) -> Result<Self, AppError> {
        let store = Self { db_path: db_path.to_path_buf() };
        let conn = store.conn()?;
        init_schema(&conn)?;
        Ok(store)
    }

    /// Open a connection and apply recommended pragmas.
    ///
    /// - `journal_mode = WAL` — concurrent readers alongside a writer.
    /// - `busy_timeout = 5000` — wait up to 5 s before `SQLITE_BUSY`.
    fn conn(&self) -> Result<Connection, AppError> {
        let conn = Connection::open(&self.db_path)
            .map_err(|e| AppError::Store(format!("open {}: {e}", self.db_path.display())))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| AppError::Store(format!("set journal_mode WAL: {e}")))?;
        conn.pragma_update(None, "busy_timeout", 5000)
            .map_err(|e| AppError::Store(format!("set busy_timeout: {e}")))?;
        Ok(conn)
    }

    /// Insert an expense row timestamped now and return its id.
    ///
    /// `category` must already be lowercased (see [`parse_entry`](crate::ledger::parse_entry)).
    pub fn insert(&self, category: &str, amount: f64, note: &str, user: &str) -> Result<i64, AppError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO expenses (timestamp,user,entry_type,name,amount,category,note,payment_method,account_type)
             VALUES (?1,?2,'Expense','',?3,?4,?5,'Cash','')",
            params![now_timestamp(), user, amount, category, note],
        )
        .map_err(|e| AppError::Store(format!("insert expense: {e}")))?;
        Ok(conn.last_insert_rowid())
    }

    /// Per-category totals for `Expense` rows, largest first.
    ///
    /// `range` optionally restricts to an inclusive `(start, end)` timestamp
    /// window in store format.
    pub fn totals_by_category(
        &self,
        range: Option<(&str, &str)>,
    ) -> Result<Vec<CategoryTotal>, AppError> {
        let conn = self.conn()?;
        let rows = match range {
            Some((start, end)) => {
                let mut stmt = conn
                    .prepare(
                        "SELECT category, SUM(amount) FROM expenses
                         WHERE timestamp BETWEEN ?1 AND ?2 AND entry_type='Expense'
                         GROUP BY category ORDER BY SUM(amount) DESC",
                    )
                    .map_err(|e| AppError::Store(format!("totals prepare: {e}")))?;
                let mapped = stmt
                    .query_map(params![start, end], total_from_row)
                    .map_err(|e| AppError::Store(format!("totals query: {e}")))?;
                mapped.collect::<Result<Vec<_>, _>>()
            }
            None => {
                let mut stmt = conn
                    .prepare(
                        "SELECT category, SUM(amount) FROM expenses
                         WHERE entry_type='Expense'
                         GROUP BY category ORDER BY SUM(amount) DESC",
                    )
                    .map_err(|e| AppError::Store(format!("totals prepare: {e}")))?;
                let mapped = stmt
                    .query_map([], total_from_row)
                    .map_err(|e| AppError::Store(format!("totals query: {e}")))?;
                mapped.collect::<Result<Vec<_>, _>>()
            }
        };
        rows.map_err(|e| AppError::Store(format!("totals row: {e}")))
    }

    /// All-time sum for one category (case-insensitive); 0.0 when absent.
    pub fn category_sum(&self, category: &str) -> Result<f64, AppError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT COALESCE(SUM(amount),0) FROM expenses
             WHERE entry_type='Expense' AND LOWER(category)=?1",
            params![category.to_lowercase()],
            |row| row.get(0),
        )
        .map_err(|e| AppError::Store(format!("category sum: {e}")))
    }

    /// All entries for one category, newest first.
    pub fn category_entries(&self, category: &str) -> Result<Vec<Entry>, AppError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, timestamp, user, entry_type, name, amount, category, note, payment_method, account_type
                 FROM expenses
                 WHERE entry_type='Expense' AND LOWER(category)=?1
                 ORDER BY datetime(timestamp) DESC, id DESC",
            )
            .map_err(|e| AppError::Store(format!("detail prepare: {e}")))?;
        let rows = stmt
            .query_map(params![category.to_lowercase()], entry_from_row)
            .map_err(|e| AppError::Store(format!("detail query: {e}")))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Store(format!("detail row: {e}")))
    }

    /// Delete one entry by id. Returns `false` when no such row existed.
    pub fn delete_entry(&self, id: i64) -> Result<bool, AppError> {
        let conn = self.conn()?;
        let changed = conn
            .execute("DELETE FROM expenses WHERE id=?1", params![id])
            .map_err(|e| AppError::Store(format!("delete entry {id}: {e}")))?;
        Ok(changed > 0)
    }

    /// Delete every row. Returns the number of rows removed.
    pub fn clear(&self) -> Result<usize, AppError> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM expenses", [])
            .map_err(|e| AppError::Store(format!("clear: {e}")))
    }

    /// Every row in insertion order — the export feed.
    pub fn all_entries(&self) -> Result<Vec<Entry>, AppError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, timestamp, user, entry_type, name, amount, category, note, payment_method, account_type
                 FROM expenses ORDER BY id",
            )
            .map_err(|e| AppError::Store(format!("export prepare: {e}")))?;
        let rows = stmt
            .query_map([], entry_from_row)
            .map_err(|e| AppError::Store(format!("export query: {e}")))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Store(format!("export row: {e}")))
    }
}

fn total_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CategoryTotal> {
    Ok(CategoryTotal { category: row.get(0)?, total: row.get(1)? })
}

fn entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entry> {
    Ok(Entry {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        user: row.get(2)?,
        entry_type: row.get(3)?,
        name: row.get(4)?,
        amount: row.get(5)?,
        category: row.get(6)?,
        note: row.get(7)?,
        payment_method: row.get(8)?,
        account_type: row.get(9)?,
    })
}

/// Execute the v1 schema DDL. Sets `PRAGMA user_version` so a future
/// migration can detect older files.
fn init_schema(conn: &Connection) -> Result<(), AppError> {
    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT,
            user TEXT,
            entry_type TEXT,
            name TEXT,
            amount REAL,
            category TEXT,
            note TEXT,
            payment_method TEXT,
            account_type TEXT
        );

        PRAGMA user_version = {SCHEMA_VERSION};
        ",
    ))
    .map_err(|e| AppError::Store(format!("initialize schema: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, ExpenseStore) {
        let tmp = TempDir::new().expect("tempdir");
        let store = ExpenseStore::open(&tmp.path().join("expenses.db")).expect("open");
        (tmp, store)
    }

    #[test]
    fn open_creates_db_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("expenses.db");
        let _store = ExpenseStore::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn insert_returns_increasing_ids() {
        let (_tmp, store) = open_store();
        let a = store.insert("food", 10.0, "", "alice").unwrap();
        let b = store.insert("food", 5.0, "", "alice").unwrap();
        assert!(b > a);
    }

    #[test]
    fn totals_are_grouped_and_sorted_desc() {
        let (_tmp, store) = open_store();
        store.insert("food", 10.0, "", "").unwrap();
        store.insert("food", 15.0, "", "").unwrap();
        store.insert("transport", 40.0, "", "").unwrap();

        let totals = store.totals_by_category(None).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].category, "transport");
        assert_eq!(totals[0].total, 40.0);
        assert_eq!(totals[1].category, "food");
        assert_eq!(totals[1].total, 25.0);
    }

    #[test]
    fn totals_respect_range() {
        let (_tmp, store) = open_store();
        store.insert("food", 10.0, "", "").unwrap();
        // Window entirely in the past excludes the fresh row.
        let totals = store
            .totals_by_category(Some(("2000-01-01 00:00:00", "2000-12-31 23:59:59")))
            .unwrap();
        assert!(totals.is_empty());

        let totals = store
            .totals_by_category(Some(("2000-01-01 00:00:00", "2999-12-31 23:59:59")))
            .unwrap();
        assert_eq!(totals.len(), 1);
    }

    #[test]
    fn category_sum_is_case_insensitive() {
        let (_tmp, store) = open_store();
        store.insert("food", 12.5, "", "").unwrap();
        assert_eq!(store.category_sum("Food").unwrap(), 12.5);
        assert_eq!(store.category_sum("FOOD").unwrap(), 12.5);
        assert_eq!(store.category_sum("rent").unwrap(), 0.0);
    }

    #[test]
    fn category_entries_newest_first() {
        let (_tmp, store) = open_store();
        let first = store.insert("food", 1.0, "first", "").unwrap();
        let second = store.insert("food", 2.0, "second", "").unwrap();

        let entries = store.category_entries("food").unwrap();
        assert_eq!(entries.len(), 2);
        // Same timestamp second resolution — id breaks the tie.
        assert_eq!(entries[0].id, second);
        assert_eq!(entries[1].id, first);
        assert_eq!(entries[0].note, "second");
    }

    #[test]
    fn delete_reports_missing_rows() {
        let (_tmp, store) = open_store();
        let id = store.insert("food", 1.0, "", "").unwrap();
        assert!(store.delete_entry(id).unwrap());
        assert!(!store.delete_entry(id).unwrap());
        assert!(!store.delete_entry(9999).unwrap());
    }

    #[test]
    fn clear_removes_everything() {
        let (_tmp, store) = open_store();
        store.insert("food", 1.0, "", "").unwrap();
        store.insert("rent", 2.0, "", "").unwrap();
        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.all_entries().unwrap().is_empty());
    }

    #[test]
    fn all_entries_carry_defaults() {
        let (_tmp, store) = open_store();
        store.insert("food", 1.0, "snack", "bob").unwrap();
        let entries = store.all_entries().unwrap();
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.entry_type, "Expense");
        assert_eq!(e.payment_method, "Cash");
        assert_eq!(e.user, "bob");
        assert_eq!(e.note, "snack");
        assert_eq!(e.name, "");
        assert_eq!(e.account_type, "");
    }
}
