//! Transaction record types produced by the statement parsers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a transaction decreased or increased the balance
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    Debit,
    Credit,
    /// The amount/direction pattern did not match
    #[default]
    Unknown,
}

impl Direction {
    /// Case-insensitive keyword lookup ("DEBIT", "credit", ...)
    pub fn from_keyword(word: &str) -> Self {
        match word.trim().to_lowercase().as_str() {
            "debit" => Direction::Debit,
            "credit" => Direction::Credit,
            _ => Direction::Unknown,
        }
    }

    /// Title-cased label used in tabular output; empty for `Unknown`
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Debit => "Debit",
            Direction::Credit => "Credit",
            Direction::Unknown => "",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Direction::Unknown)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Unknown => f.write_str("Unknown"),
            other => f.write_str(other.label()),
        }
    }
}

/// One parsed statement entry.
///
/// Every record comes from exactly one anchor-delimited chunk of statement text,
/// so `reference_id` is never empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    /// Date and time as printed on the statement, joined by a space
    pub timestamp_text: String,
    /// Counterparty / description, sanitized
    pub details: String,
    /// Anchor token value (UTR / reference number)
    pub reference_id: String,
    /// Secondary identifier (e.g. the wallet's transaction ID); may be empty
    pub secondary_id: String,
    pub direction: Direction,
    /// Non-negative; 0.0 when the amount pattern did not match
    pub amount: f64,
    /// Assigned by the category rules in post-processing
    pub category: Option<String>,
}

impl TransactionRecord {
    /// Create a record with the mandatory anchor value; other fields start empty.
    pub fn new(reference_id: impl Into<String>) -> Self {
        Self {
            timestamp_text: String::new(),
            details: String::new(),
            reference_id: reference_id.into(),
            secondary_id: String::new(),
            direction: Direction::Unknown,
            amount: 0.0,
            category: None,
        }
    }

    /// Join date and time parts, skipping whichever is missing
    pub fn with_timestamp(mut self, date: Option<&str>, time: Option<&str>) -> Self {
        let parts: Vec<&str> = [date, time]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        self.timestamp_text = parts.join(" ");
        self
    }

    /// Positive for credits, negative for debits, zero when the direction is unknown
    pub fn signed_amount(&self) -> f64 {
        match self.direction {
            Direction::Debit => -self.amount,
            Direction::Credit => self.amount,
            Direction::Unknown => 0.0,
        }
    }

    /// Category label, or `fallback` when none was assigned
    pub fn category_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.category.as_deref().unwrap_or(fallback)
    }
}
