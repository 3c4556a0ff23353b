//! Keyword category rules for transaction details.
//!
//! Rules are an ordered list: the first rule with a keyword contained in the
//! details (case-insensitive) wins, so list order is priority.

use passbook_core::{TransactionRecord, FALLBACK_CATEGORY};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub label: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(label: &str, keywords: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRules {
    rules: Vec<CategoryRule>,
    fallback: String,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategoryRules {
    /// Keywords are lowercased; blank keywords are ignored.
    pub fn new(rules: Vec<CategoryRule>, fallback: impl Into<String>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| CategoryRule {
                label: r.label,
                keywords: r
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .collect();
        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    /// Rules tuned for Indian UPI statements
    pub fn builtin() -> Self {
        Self::new(
            vec![
                CategoryRule::new(
                    "Groceries",
                    &[
                        "kirana", "grocery", "supermarket", "bigbasket", "blinkit", "zepto",
                        "dmart", "milk", "dairy", "vegetable", "fruits",
                    ],
                ),
                CategoryRule::new(
                    "Food & Dining",
                    &["restaurant", "swiggy", "zomato", "cafe", "bakery", "dhaba", "pizza", "food"],
                ),
                CategoryRule::new(
                    "Transport",
                    &["uber", "ola", "rapido", "metro", "irctc", "fuel", "petrol", "fastag", "parking"],
                ),
                CategoryRule::new(
                    "Bills & Utilities",
                    &[
                        "electricity", "recharge", "airtel", "jio", "vodafone", "broadband",
                        "water bill", "gas", "bill",
                    ],
                ),
                CategoryRule::new(
                    "Shopping",
                    &["amazon", "flipkart", "myntra", "ajio", "meesho", "mall"],
                ),
                CategoryRule::new(
                    "Entertainment",
                    &["netflix", "spotify", "hotstar", "bookmyshow", "pvr", "inox"],
                ),
                CategoryRule::new(
                    "Health",
                    &["pharmacy", "medical", "chemist", "hospital", "clinic", "apollo"],
                ),
                CategoryRule::new("Rent", &["rent", "landlord", "society maintenance"]),
            ],
            FALLBACK_CATEGORY,
        )
    }

    /// First matching rule's label, else the fallback
    pub fn categorize(&self, details: &str) -> &str {
        let desc = details.to_lowercase();
        self.rules
            .iter()
            .find(|r| r.keywords.iter().any(|k| desc.contains(k.as_str())))
            .map(|r| r.label.as_str())
            .unwrap_or(&self.fallback)
    }

    /// Assign a category to every record
    pub fn apply(&self, records: &mut [TransactionRecord]) {
        for record in records {
            record.category = Some(self.categorize(&record.details).to_string());
        }
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Labels in priority order, fallback last
    pub fn labels(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.rules.iter().map(|r| r.label.as_str()).collect();
        if !out.contains(&self.fallback.as_str()) {
            out.push(&self.fallback);
        }
        out
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }
}
