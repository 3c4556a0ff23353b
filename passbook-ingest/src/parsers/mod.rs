//! Record extraction strategies.

pub mod anchor_split;
pub mod line_state;

use passbook_core::{sanitize_text, TransactionRecord};
use tracing::{debug, info};

use crate::text::{to_blob, to_lines};
use crate::types::{Dialect, Strategy};

pub use anchor_split::parse_blob;
pub use line_state::parse_lines;

/// Run `strategy` over acquired page text. Details come back sanitized, in source order.
pub fn extract(pages: &[String], dialect: &Dialect, strategy: Strategy) -> Vec<TransactionRecord> {
    let mut records = match strategy {
        Strategy::Lines => parse_lines(&to_lines(pages, dialect), dialect),
        Strategy::Blob => parse_blob(&to_blob(pages, dialect), dialect),
        Strategy::Auto => {
            let by_lines = parse_lines(&to_lines(pages, dialect), dialect);
            if by_lines.is_empty() {
                debug!(dialect = %dialect.name, "line parser found nothing; trying anchor split");
                parse_blob(&to_blob(pages, dialect), dialect)
            } else {
                by_lines
            }
        }
    };

    for record in &mut records {
        record.details = sanitize_text(&record.details);
    }

    info!(dialect = %dialect.name, %strategy, records = records.len(), "extracted records");
    records
}
