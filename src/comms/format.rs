//! Message rendering for the Telegram channel.
//!
//! Everything here is a pure function from ledger data to the (legacy)
//! Markdown strings the bot sends, so the whole presentation layer is
//! testable without a live chat.

use crate::ledger::{pretty, CategoryTotal, Entry};

/// Telegram has a 4096 character limit per message.
/// We chunk at 4000 to be safe.
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// Widest bar drawn in the `/top` charts.
const BAR_WIDTH: usize = 12;

pub const ENTRY_HINT_MISSING_FIELDS: &str =
    "❌ Please enter Category and Amount.\nExample: `Food 25 Lunch`";

pub const ENTRY_HINT_BAD_AMOUNT: &str =
    "❌ Amount must be a number.\nExample: `Food 25 Lunch`";

pub const DETAIL_USAGE: &str = "Usage: /detail <category>";

pub const DELETE_USAGE: &str = "Usage: /delete <id>";

pub const CLEAR_PROMPT: &str = "🗑️ This will permanently delete all data. Continue?";

pub const CLEARED: &str = "✅ All data cleared.";

pub const CLEAR_CANCELLED: &str = "❌ Cancelled.";

pub fn help_text() -> String {
    concat!(
        "*💰 Welcome to your Expense Tracker!*\n",
        "To log an expense, simply type:\n",
        "`Category Amount [optional note]`\n",
        "Example: `Food 25 Lunch`\n\n",
        "✨ *Available Commands:*\n",
        "📊 `/sum` — View total expenses by category\n",
        "🗓 `/today` — Show today's expenses\n",
        "📅 `/week` — Show this week's expenses\n",
        "📈 `/month` — Show this month's expenses\n",
        "🏆 `/top` — View expense charts\n",
        "🔎 `/detail <category>` — View total and detailed logs for a category\n",
        "❌ `/delete <id>` — Delete a specific entry\n",
        "🗑️ `/clear` — Delete all your data\n\n",
        "💡 No need to use the `$` sign — all entries are logged in dollars.\n\n",
        "✅ Every transaction is automatically saved to your Excel file.\n",
    )
    .to_string()
}

/// All-time totals, `/sum`.
pub fn sum_message(totals: &[CategoryTotal]) -> String {
    let mut text = String::from("💰 *Total Expenses by Category:*\n\n");
    push_totals(&mut text, totals);
    text
}

/// Period totals, `/today` `/week` `/month`.
pub fn period_message(title: &str, totals: &[CategoryTotal]) -> String {
    let mut text = format!("📅 *{title} Expenses:*\n\n");
    push_totals(&mut text, totals);
    text
}

/// "No data" reply for a period summary (`"today"`, `"week"`, …).
pub fn empty_period_message(title: &str) -> String {
    format!("No {} expenses logged yet.", title.to_lowercase())
}

pub const NO_EXPENSES: &str = "No expenses logged yet.";

/// Confirmation after a plain-text entry was logged.
pub fn logged_message(id: i64, category: &str, all_time_sum: f64) -> String {
    format!(
        "✅ Your transaction has been logged (ID: {id}).\n💰 {} All-Time Total: ${all_time_sum:.2}",
        pretty(category),
    )
}

/// `/detail <category>` body: all-time total plus entry-by-entry log.
pub fn detail_message(category: &str, total: f64, entries: &[Entry]) -> String {
    let mut text = format!("💰 *{}* — All-Time Total: ${total:.2}\n", pretty(category));
    for e in entries {
        let note_part = if e.note.is_empty() { String::new() } else { format!(" · {}", e.note) };
        text.push_str(&format!("#{} · {} · ${:.2}{note_part}\n", e.id, e.timestamp, e.amount));
    }
    text
}

pub fn missing_category_message(category: &str) -> String {
    format!("No entries for *{}*.", pretty(category))
}

pub fn delete_result_message(id: i64, deleted: bool) -> String {
    if deleted {
        format!("❌ Entry {id} deleted.")
    } else {
        format!("No entry found with ID {id}.")
    }
}

pub const INVALID_ID: &str = "Invalid ID.";

/// `/top` — distribution and totals rendered as Unicode bar charts.
pub fn top_message(totals: &[CategoryTotal]) -> String {
    let grand_total: f64 = totals.iter().map(|t| t.total).sum();
    let max = totals.iter().map(|t| t.total).fold(0.0_f64, f64::max);

    let mut text = String::from("📊 *Expense Distribution (%):*\n");
    for t in totals {
        let pct = if grand_total > 0.0 { t.total / grand_total * 100.0 } else { 0.0 };
        text.push_str(&format!("{} {} {pct:.1}%\n", bar(t.total, grand_total), pretty(&t.category)));
    }

    text.push_str("\n💵 *Total by Category ($):*\n");
    for t in totals {
        text.push_str(&format!("{} {} ${:.2}\n", bar(t.total, max), pretty(&t.category), t.total));
    }
    text
}

/// Scale `value` against `scale` into a bar of at most [`BAR_WIDTH`] blocks.
/// Non-zero values always get at least one block.
fn bar(value: f64, scale: f64) -> String {
    if scale <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let blocks = ((value / scale) * BAR_WIDTH as f64).round() as usize;
    "▇".repeat(blocks.clamp(1, BAR_WIDTH))
}

/// Split a reply into chunks below the Telegram per-message limit.
/// Empty input becomes a single placeholder chunk.
pub fn chunk_message(text: &str) -> Vec<String> {
    if text.is_empty() {
        return vec!["(empty response)".to_string()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(MAX_MESSAGE_LENGTH)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn push_totals(text: &mut String, totals: &[CategoryTotal]) {
    for t in totals {
        text.push_str(&format!("{}: ${:.2}\n", pretty(&t.category), t.total));
    }
}
