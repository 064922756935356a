//! Ledger domain — expense entries, free-text parsing, and presentation helpers.
//!
//! Categories are normalized to lowercase at the edge ([`parse_entry`]) and
//! title-cased for display ([`pretty`]). The storage layer never sees a
//! mixed-case category.

pub mod period;
pub mod store;

pub use period::Period;
pub use store::ExpenseStore;

/// A persisted expense row.
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: i64,
    /// Local time, `YYYY-MM-DD HH:MM:SS` — sorts lexicographically.
    pub timestamp: String,
    pub user: String,
    pub entry_type: String,
    pub name: String,
    pub amount: f64,
    pub category: String,
    pub note: String,
    pub payment_method: String,
    pub account_type: String,
}

/// Aggregated total for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// A successfully parsed `Category Amount [note]` message.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntry {
    /// Lowercased category.
    pub category: String,
    pub amount: f64,
    pub note: String,
}

/// Why a free-text entry could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Fewer than two whitespace-separated fields.
    MissingFields,
    /// Second field is not a number.
    BadAmount,
}

/// Parse a plain-text expense message of the form `Category Amount [note]`.
pub fn parse_entry(text: &str) -> Result<ParsedEntry, ParseError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(ParseError::MissingFields);
    }
    let amount: f64 = tokens[1].parse().map_err(|_| ParseError::BadAmount)?;
    Ok(ParsedEntry {
        category: tokens[0].to_lowercase(),
        amount,
        note: tokens[2..].join(" "),
    })
}

/// Title-case a stored (lowercase) category for display.
pub fn pretty(cat: &str) -> String {
    cat.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_category_and_amount() {
        let p = parse_entry("Food 25").unwrap();
        assert_eq!(p.category, "food");
        assert_eq!(p.amount, 25.0);
        assert_eq!(p.note, "");
    }

    #[test]
    fn parse_keeps_note() {
        let p = parse_entry("Food 25.50 Lunch with friends").unwrap();
        assert_eq!(p.amount, 25.50);
        assert_eq!(p.note, "Lunch with friends");
    }

    #[test]
    fn parse_single_token_is_missing_fields() {
        assert_eq!(parse_entry("Food").unwrap_err(), ParseError::MissingFields);
        assert_eq!(parse_entry("  ").unwrap_err(), ParseError::MissingFields);
    }

    #[test]
    fn parse_non_numeric_amount() {
        assert_eq!(parse_entry("Food lots").unwrap_err(), ParseError::BadAmount);
    }

    #[test]
    fn pretty_title_cases() {
        assert_eq!(pretty("food"), "Food");
        assert_eq!(pretty("eating out"), "Eating Out");
        assert_eq!(pretty(""), "");
    }
}
