//! passbook-core: transaction record types and text cleanup shared by the pipeline

pub mod record;
pub mod sanitize;

pub use record::{Direction, TransactionRecord};
pub use sanitize::{parse_amount, sanitize_text};

/// Label used when no category rule matches
pub const FALLBACK_CATEGORY: &str = "Uncategorized";
