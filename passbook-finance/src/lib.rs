//! passbook-finance: category rules, statement summary, and CSV/XLSX export

pub mod category_rules;
pub mod export;
pub mod summary;

pub use category_rules::{CategoryRule, CategoryRules};
pub use export::{write_csv, write_file, write_xlsx, ExportOptions, OutputFormat};
pub use summary::{CategoryTotal, Period, Summary};
