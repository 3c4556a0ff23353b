//! Anchor-split parser over one concatenated text blob.
//!
//! The blob is cut at every anchor marker ("UTR No:" and friends). The token
//! right after a marker is the anchor value; the text bound to that value is
//! one candidate record. Fields are searched independently inside it, so a
//! missing field leaves that field empty instead of losing the record.
//!
//! Leading layout, fields after the marker:
//!
//! ```text
//! UTR No: ABC123 Jun 03, 2025 10:15 AM Paid to Kirana Store DEBIT ₹500 Transaction ID T1
//! ```
//!
//! Trailing layout (merged PhonePe lines), fields before the marker:
//!
//! ```text
//! Jun 03, 2025 Paid to Kirana Store Debit INR 500.00 10:15 AM Transaction ID : T1 UTR No : U1
//! ```

use passbook_core::{parse_amount, Direction, TransactionRecord};
use tracing::debug;

use crate::types::{AnchorPlacement, Dialect};

/// Parse every anchor-bound record of `text`, in source order.
///
/// Leading layout discards the text before the first anchor; trailing layout
/// discards the text after the last anchor value.
pub fn parse_blob(text: &str, dialect: &Dialect) -> Vec<TransactionRecord> {
    match placement(text, dialect) {
        AnchorPlacement::Trailing => parse_trailing(text, dialect),
        _ => parse_leading(text, dialect),
    }
}

fn placement(text: &str, dialect: &Dialect) -> AnchorPlacement {
    match dialect.anchor_placement {
        AnchorPlacement::Detect => {
            let Some(first) = dialect.anchor.find(text) else {
                return AnchorPlacement::Leading;
            };
            if dialect.amount.is_match(&text[..first.start()]) {
                debug!(dialect = %dialect.name, "amount before first anchor; reading trailing layout");
                AnchorPlacement::Trailing
            } else {
                AnchorPlacement::Leading
            }
        }
        fixed => fixed,
    }
}

fn parse_leading(text: &str, dialect: &Dialect) -> Vec<TransactionRecord> {
    let mut out = Vec::new();

    for (idx, segment) in dialect.anchor.split(text).enumerate().skip(1) {
        match parse_segment(segment, dialect) {
            Some(record) => out.push(record),
            None => debug!(segment = idx, "no anchor value; segment dropped"),
        }
    }

    out
}

fn parse_trailing(text: &str, dialect: &Dialect) -> Vec<TransactionRecord> {
    let mut out = Vec::new();
    let mut fields_start = 0;

    for (idx, marker) in dialect.anchor.find_iter(text).enumerate() {
        let fields = &text[fields_start..marker.start()];
        let after = &text[marker.end()..];
        fields_start = marker.end() + first_token(after).map_or(0, |(_, end)| end);

        match anchor_value(after) {
            Some(reference) => out.push(fill_fields(TransactionRecord::new(reference), fields, dialect)),
            None => debug!(segment = idx, "no anchor value; segment dropped"),
        }
    }

    out
}

/// One leading-layout segment → one record, or `None` when the segment has no anchor value.
pub fn parse_segment(segment: &str, dialect: &Dialect) -> Option<TransactionRecord> {
    let reference = anchor_value(segment)?;
    Some(fill_fields(TransactionRecord::new(reference), segment, dialect))
}

fn fill_fields(record: TransactionRecord, region: &str, dialect: &Dialect) -> TransactionRecord {
    let mut record = record.with_timestamp(find_date(region, dialect), find_time(region, dialect));

    // details stop at the keyword the amount was read from
    let mut details_region = region;
    if let Some((direction, amount, keyword_end)) = find_amount(region, dialect) {
        record.direction = direction;
        record.amount = amount;
        details_region = &region[..keyword_end];
    }
    if let Some(id) = find_secondary_id(region, dialect) {
        record.secondary_id = id.to_string();
    }
    if let Some(details) = find_details(details_region, dialect) {
        record.details = details.to_string();
    }

    record
}

/// First whitespace-delimited token and the byte offset just past it
fn first_token(s: &str) -> Option<(&str, usize)> {
    let start = s.find(|c: char| !c.is_whitespace())?;
    let rest = &s[start..];
    let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
    Some((&rest[..len], start + len))
}

/// First token with surrounding punctuation removed
fn anchor_value(s: &str) -> Option<&str> {
    let (token, _) = first_token(s)?;
    let token = token.trim_matches(|c: char| !c.is_alphanumeric());
    if token.is_empty() { None } else { Some(token) }
}

fn find_date<'a>(segment: &'a str, dialect: &Dialect) -> Option<&'a str> {
    dialect.date.find(segment).map(|m| m.as_str())
}

fn find_time<'a>(segment: &'a str, dialect: &Dialect) -> Option<&'a str> {
    dialect.time.find(segment).map(|m| m.as_str())
}

/// Direction, amount, and where the direction keyword ends
fn find_amount(segment: &str, dialect: &Dialect) -> Option<(Direction, f64, usize)> {
    let caps = dialect.amount.captures(segment)?;
    let keyword = caps.get(1)?;
    let amount = parse_amount(caps.get(2)?.as_str())?;
    Some((Direction::from_keyword(keyword.as_str()), amount, keyword.end()))
}

fn find_secondary_id<'a>(segment: &'a str, dialect: &Dialect) -> Option<&'a str> {
    let caps = dialect.secondary_id.captures(segment)?;
    Some(caps.get(1)?.as_str())
}

fn find_details<'a>(segment: &'a str, dialect: &Dialect) -> Option<&'a str> {
    let caps = dialect.details.captures(segment)?;
    let details = caps.get(1)?.as_str().trim();
    if details.is_empty() { None } else { Some(details) }
}
