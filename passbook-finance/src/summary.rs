//! Summary metrics over a parsed statement: totals by direction, spend per
//! category (in rule priority order), and the statement period.

use chrono::NaiveDate;
use passbook_core::{Direction, TransactionRecord};
use serde::Serialize;

use crate::category_rules::CategoryRules;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub label: String,
    pub count: usize,
    pub debit_total: f64,
    pub credit_total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub debit_count: usize,
    pub credit_count: usize,
    /// Records whose amount/direction could not be read
    pub unknown_count: usize,
    pub total_debit: f64,
    pub total_credit: f64,
    /// Credits minus debits
    pub net: f64,
    pub by_category: Vec<CategoryTotal>,
    pub period: Option<Period>,
}

impl Summary {
    /// Records without a category count toward the rules' fallback label.
    pub fn from_records(records: &[TransactionRecord], rules: &CategoryRules) -> Self {
        let mut by_category: Vec<CategoryTotal> = rules
            .labels()
            .into_iter()
            .map(|label| CategoryTotal {
                label: label.to_string(),
                count: 0,
                debit_total: 0.0,
                credit_total: 0.0,
            })
            .collect();

        let mut summary = Summary {
            count: records.len(),
            debit_count: 0,
            credit_count: 0,
            unknown_count: 0,
            total_debit: 0.0,
            total_credit: 0.0,
            net: 0.0,
            by_category: Vec::new(),
            period: None,
        };

        for r in records {
            match r.direction {
                Direction::Debit => {
                    summary.debit_count += 1;
                    summary.total_debit += r.amount;
                }
                Direction::Credit => {
                    summary.credit_count += 1;
                    summary.total_credit += r.amount;
                }
                Direction::Unknown => summary.unknown_count += 1,
            }

            summary.net += r.signed_amount();

            let label = r.category_or(rules.fallback());
            let idx = match by_category.iter().position(|c| c.label == label) {
                Some(i) => i,
                None => {
                    // category from an older rule set
                    by_category.push(CategoryTotal {
                        label: label.to_string(),
                        count: 0,
                        debit_total: 0.0,
                        credit_total: 0.0,
                    });
                    by_category.len() - 1
                }
            };
            let entry = &mut by_category[idx];
            entry.count += 1;
            match r.direction {
                Direction::Debit => entry.debit_total += r.amount,
                Direction::Credit => entry.credit_total += r.amount,
                Direction::Unknown => {}
            }

            if let Some(date) = parse_statement_date(&r.timestamp_text) {
                summary.period = Some(match summary.period {
                    None => Period { first: date, last: date },
                    Some(p) => Period {
                        first: p.first.min(date),
                        last: p.last.max(date),
                    },
                });
            }
        }

        summary.by_category = by_category.into_iter().filter(|c| c.count > 0).collect();
        summary
    }
}

/// Best-effort date from the free-form timestamp ("Jun 03, 2025 10:15 AM", "03/06/2025 14:05", "3 Jun 2025")
pub fn parse_statement_date(timestamp_text: &str) -> Option<NaiveDate> {
    let tokens: Vec<&str> = timestamp_text.split_whitespace().collect();

    if tokens.len() >= 3 {
        let head = tokens[..3].join(" ");
        for fmt in ["%b %d, %Y", "%d %b %Y"] {
            if let Ok(d) = NaiveDate::parse_from_str(&head, fmt) {
                return Some(d);
            }
        }
    }

    let first = tokens.first()?;
    ["%d/%m/%Y", "%d-%m-%Y", "%d/%m/%y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(first, fmt).ok())
}
