use anyhow::{bail, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which record-extraction strategy to run over acquired text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Line-oriented state machine; falls back to `Blob` when it finds nothing
    #[default]
    Auto,
    /// Line-oriented state machine over filtered lines
    Lines,
    /// Anchor-split over the concatenated text
    Blob,
}

impl FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Strategy::Auto),
            "lines" | "line" => Ok(Strategy::Lines),
            "blob" | "anchor" => Ok(Strategy::Blob),
            other => bail!("unknown strategy: {other} (expected auto, lines or blob)"),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Auto => "auto",
            Strategy::Lines => "lines",
            Strategy::Blob => "blob",
        })
    }
}

/// Where the anchor marker sits relative to the fields of its transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnchorPlacement {
    /// `UTR No: X1 Jun 03, 2025 Paid to ...`: fields follow the marker
    Leading,
    /// `Jun 03, 2025 Paid to ... UTR No: X1`: fields precede the marker
    Trailing,
    /// Trailing when the text before the first marker holds an amount, else leading
    #[default]
    Detect,
}

/// Repeated header/footer lines dropped during line acquisition
#[derive(Debug, Clone, Default)]
pub struct Boilerplate {
    /// Lines starting with any of these are dropped
    pub prefixes: Vec<String>,
    /// Lines containing any of these are dropped
    pub contains: Vec<String>,
    /// Drop "Page 3 of 7"-style footers
    pub page_footers: bool,
}

impl Boilerplate {
    pub fn is_boilerplate(&self, line: &str) -> bool {
        if self.prefixes.iter().any(|p| line.starts_with(p.as_str())) {
            return true;
        }
        if self.contains.iter().any(|c| line.contains(c.as_str())) {
            return true;
        }
        if self.page_footers {
            let lower = line.to_lowercase();
            if lower.starts_with("page ") && lower.contains("of") {
                return true;
            }
        }
        false
    }
}

/// A named bundle of extraction patterns for one statement layout.
///
/// Blob patterns are searched anywhere inside an anchor-delimited segment.
/// Line patterns are matched from the start of a trimmed line.
#[derive(Debug, Clone)]
pub struct Dialect {
    pub name: String,

    // --- blob strategy ---
    /// Marker that precedes every reference id; text is split on it
    pub anchor: Regex,
    pub anchor_placement: AnchorPlacement,
    pub date: Regex,
    pub time: Regex,
    /// Group 1: direction keyword, group 2: amount literal
    pub amount: Regex,
    /// Group 1: secondary id
    pub secondary_id: Regex,
    /// Group 1: counterparty, bounded by "paid to"/"received from" and the direction keyword
    pub details: Regex,

    // --- line strategy ---
    /// Date + details + direction + amount on one line
    pub opening_line: Regex,
    /// Group 1: time, group 2: secondary id
    pub time_id_line: Regex,
    /// Literal label used when `time_id_line` does not match
    pub secondary_label: String,
    /// Group 1: anchor value
    pub anchor_line: Regex,
    /// Lowercase prefixes of the optional line after the anchor line
    pub trailing_prefixes: Vec<String>,

    pub boilerplate: Boilerplate,
    /// Characters some renderers emit in place of ':'
    pub colon_substitutes: Vec<char>,
}

/// Symbol-font colon (U+F03A) seen inside timestamps
const SYMBOL_COLON: char = '\u{f03a}';

const DIRECTION_AMOUNT: &str =
    r"(?i)\b(debit|credit)\b\s*(?:INR|₹|Rs\.?)?\s*(\d[\d,]*(?:\.\d+)?)";
const DETAILS: &str = r"(?is)(?:paid\s+to|received\s+from)\s+(.+)\s+(?:debit|credit)\b";
const MON_DD_YYYY: &str = r"[A-Za-z]{3}\s+\d{1,2},\s*\d{4}";

impl Dialect {
    pub const NAMES: &'static [&'static str] = &["phonepe", "upi-generic"];

    /// Look up a built-in dialect by name (case-insensitive)
    pub fn by_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "phonepe" => Self::phonepe(),
            "upi-generic" | "upi" | "generic" => Self::upi_generic(),
            other => bail!(
                "unknown dialect: {other} (available: {})",
                Self::NAMES.join(", ")
            ),
        }
    }

    /// PhonePe statement export:
    ///
    /// ```text
    /// Jun 03, 2025 Paid to Kirana Store Debit INR 500.00
    /// 10:15 AM Transaction ID : T2506031015
    /// UTR No : 451234567890
    /// Debited from XX1234
    /// ```
    pub fn phonepe() -> Result<Self> {
        Ok(Self {
            name: "phonepe".to_string(),
            anchor: Regex::new(r"(?i)\bUTR\s*No\.?\s*[:\-]?\s*")?,
            anchor_placement: AnchorPlacement::Detect,
            date: Regex::new(&format!(r"\b{MON_DD_YYYY}"))?,
            time: Regex::new(r"(?i)\b\d{1,2}:\d{2}\s*(?:AM|PM)\b")?,
            amount: Regex::new(DIRECTION_AMOUNT)?,
            secondary_id: Regex::new(r"(?i)Transaction\s*ID\s*[:\-]?\s*(\S+)")?,
            details: Regex::new(DETAILS)?,
            opening_line: Regex::new(&format!(
                r"(?i)^{MON_DD_YYYY}\s+.*(Debit|Credit)\s+INR\s+([\d,]+(?:\.\d{{2}})?)"
            ))?,
            time_id_line: Regex::new(
                r"(?i)^(\d{1,2}:\d{2}\s*(?:AM|PM))\s+Transaction ID\s*:\s*(\S+)",
            )?,
            secondary_label: "Transaction ID".to_string(),
            anchor_line: Regex::new(r"(?i)^UTR No\s*:\s*(\S+)")?,
            trailing_prefixes: vec!["debited from".to_string(), "credited to".to_string()],
            boilerplate: Boilerplate {
                prefixes: vec![
                    "Date Transaction Details".to_string(),
                    "This is a system generated statement".to_string(),
                ],
                contains: vec!["support.phonepe.com".to_string()],
                page_footers: true,
            },
            colon_substitutes: vec![SYMBOL_COLON],
        })
    }

    /// Looser UPI layout: ₹/Rs./INR amounts, "UTR"/"Ref No" anchors, "Txn ID" ids.
    pub fn upi_generic() -> Result<Self> {
        Ok(Self {
            name: "upi-generic".to_string(),
            anchor: Regex::new(
                r"(?i)\b(?:UTR\b(?:\s*No\.?)?|Ref(?:erence)?\s*(?:No|Number)\b\.?)\s*[:\-]?\s*",
            )?,
            anchor_placement: AnchorPlacement::Detect,
            date: Regex::new(&format!(
                r"\b(?:{MON_DD_YYYY}|\d{{1,2}}\s+[A-Za-z]{{3}}\s+\d{{4}}|\d{{1,2}}[/-]\d{{1,2}}[/-]\d{{2,4}})"
            ))?,
            time: Regex::new(r"(?i)\b\d{1,2}:\d{2}(?::\d{2})?(?:\s*[AP]M)?\b")?,
            amount: Regex::new(DIRECTION_AMOUNT)?,
            secondary_id: Regex::new(r"(?i)(?:Transaction|Txn)\s*ID\s*[:\-]?\s*(\S+)")?,
            details: Regex::new(DETAILS)?,
            opening_line: Regex::new(&format!(
                r"(?i)^{MON_DD_YYYY}\s+.*(Debit|Credit)\s+(?:INR|₹|Rs\.?)\s*([\d,]+(?:\.\d{{2}})?)"
            ))?,
            time_id_line: Regex::new(
                r"(?i)^(\d{1,2}:\d{2}\s*(?:AM|PM))\s+(?:Transaction|Txn)\s*ID\s*:?\s*(\S+)",
            )?,
            secondary_label: "Transaction ID".to_string(),
            anchor_line: Regex::new(
                r"(?i)^(?:UTR(?:\s*No\.?)?|Ref(?:erence)?\s*(?:No|Number)\.?)\s*:?\s*(\S+)",
            )?,
            trailing_prefixes: vec![
                "debited from".to_string(),
                "credited to".to_string(),
                "paid by".to_string(),
            ],
            boilerplate: Boilerplate {
                prefixes: vec![
                    "Date Transaction Details".to_string(),
                    "This is a system generated statement".to_string(),
                ],
                contains: Vec::new(),
                page_footers: true,
            },
            colon_substitutes: vec![SYMBOL_COLON],
        })
    }

    /// True when `line` is the optional "Debited from ..." line after an anchor line
    pub fn is_trailing_line(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        self.trailing_prefixes.iter().any(|p| lower.starts_with(p.as_str()))
    }
}
