//! Terminal output: record preview table and summary block.

use passbook_core::TransactionRecord;
use passbook_finance::Summary;

const DETAILS_WIDTH: usize = 32;

pub fn print_preview(records: &[TransactionRecord], limit: usize) {
    if limit == 0 || records.is_empty() {
        return;
    }
    println!(
        "{:<22} {:<w$} {:<16} {:<6} {:>12}  {}",
        "Date & Time",
        "Details",
        "UTR No",
        "Type",
        "Amount",
        "Category",
        w = DETAILS_WIDTH
    );
    for r in records.iter().take(limit) {
        println!("{}", preview_line(r));
    }
    if records.len() > limit {
        println!("... {} more", records.len() - limit);
    }
    println!();
}

fn preview_line(r: &TransactionRecord) -> String {
    format!(
        "{:<22} {:<w$} {:<16} {:<6} {:>12.2}  {}",
        truncate(&r.timestamp_text, 22),
        truncate(&r.details, DETAILS_WIDTH),
        r.reference_id,
        r.direction.label(),
        r.amount,
        r.category.as_deref().unwrap_or(""),
        w = DETAILS_WIDTH
    )
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub fn print_summary(summary: &Summary) {
    println!("Transactions: {}", summary.count);
    if let Some(p) = summary.period {
        println!("Period:       {} to {}", p.first, p.last);
    }
    println!("Debits:       {} totalling {:.2}", summary.debit_count, summary.total_debit);
    println!("Credits:      {} totalling {:.2}", summary.credit_count, summary.total_credit);
    println!("Net:          {:.2}", summary.net);
    if summary.unknown_count > 0 {
        println!("Unreadable amounts: {}", summary.unknown_count);
    }

    if !summary.by_category.is_empty() {
        println!("\nBy category:");
        for c in &summary.by_category {
            println!(
                "  {:<20} {:>4}  spent {:>12.2}  received {:>12.2}",
                c.label, c.count, c.debit_total, c.credit_total
            );
        }
    }
}
