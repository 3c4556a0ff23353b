//! Line-oriented parser for statements whose text arrives one field-group per line.
//!
//! Expected layout (PhonePe export after text extraction):
//!   Jun 03, 2025 Paid to Kirana Store Debit INR 500.00
//!   10:15 AM Transaction ID : T2506031015
//!   UTR No : 451234567890
//!   Debited from XX1234            (optional)

use passbook_core::{parse_amount, Direction, TransactionRecord};
use tracing::debug;

use crate::types::Dialect;

/// Date, details, direction and amount from an opening line
#[derive(Debug, Clone, PartialEq)]
struct OpeningLine {
    date: String,
    details: String,
    direction: Direction,
    amount: f64,
}

impl OpeningLine {
    fn parse(line: &str, dialect: &Dialect) -> Option<Self> {
        let caps = dialect.opening_line.captures(line)?;

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            return None;
        }

        // last keyword wins: merchant names may contain "Credit"/"Debit"
        let dir_idx = parts
            .iter()
            .rposition(|p| Direction::from_keyword(p).is_known())?;
        if dir_idx < 3 {
            return None;
        }

        // the pattern's amount group, else the final token
        let amount = caps
            .get(2)
            .and_then(|m| parse_amount(m.as_str()))
            .or_else(|| parts.last().and_then(|t| parse_amount(t)))
            .unwrap_or(0.0);

        Some(Self {
            date: parts[0..3].join(" "),
            details: parts[3..dir_idx].join(" "),
            direction: Direction::from_keyword(parts[dir_idx]),
            amount,
        })
    }
}

/// Scan `lines` in order and build one record per opening line that has an anchor line.
pub fn parse_lines(lines: &[String], dialect: &Dialect) -> Vec<TransactionRecord> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        match parse_entry(&lines[i..], dialect) {
            Some((record, consumed)) => {
                out.push(record);
                i += consumed;
            }
            None => i += 1,
        }
    }

    out
}

/// Parse the entry starting at `window[0]`, returning the record and how many lines it used.
fn parse_entry(window: &[String], dialect: &Dialect) -> Option<(TransactionRecord, usize)> {
    let opening = OpeningLine::parse(&window[0], dialect)?;

    let (time, secondary_id) = window
        .get(1)
        .map(|l| time_and_id(l, dialect))
        .unwrap_or_default();

    let Some(reference) = window.get(2).and_then(|l| anchor_value(l, dialect)) else {
        debug!(line = %window[0], "opening line without anchor line; skipped");
        return None;
    };

    let consumed = match window.get(3) {
        Some(l) if dialect.is_trailing_line(l) => 4,
        _ => 3,
    };

    let mut record = TransactionRecord::new(reference)
        .with_timestamp(Some(opening.date.as_str()), time.as_deref());
    record.details = opening.details;
    record.direction = opening.direction;
    record.amount = opening.amount;
    record.secondary_id = secondary_id.unwrap_or_default();

    Some((record, consumed))
}

/// Time and secondary id from the line after an opening line.
///
/// Falls back to the text after the literal id label when the strict pattern misses.
fn time_and_id(line: &str, dialect: &Dialect) -> (Option<String>, Option<String>) {
    if let Some(caps) = dialect.time_id_line.captures(line) {
        return (
            caps.get(1).map(|m| m.as_str().to_string()),
            caps.get(2).map(|m| m.as_str().to_string()),
        );
    }

    let Some((_, after)) = line.split_once(dialect.secondary_label.as_str()) else {
        return (None, None);
    };
    let id = after.replace(':', "").trim().to_string();
    let time = dialect.time.find(line).map(|m| m.as_str().to_string());
    (time, if id.is_empty() { None } else { Some(id) })
}

fn anchor_value(line: &str, dialect: &Dialect) -> Option<String> {
    let caps = dialect.anchor_line.captures(line)?;
    Some(caps.get(1)?.as_str().to_string())
}
