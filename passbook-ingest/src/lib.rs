//! passbook-ingest: PDF text acquisition, statement dialects, and record extraction.

pub mod acquire;
pub mod document;
pub mod error;
pub mod parsers;
pub mod text;
pub mod types;

pub use acquire::{acquire, acquire_pdf, unlock_to, AcquireOptions, Acquired, DecryptedCopy};
pub use document::{LopdfDocument, PdfSource, StatementDocument};
pub use error::AcquireError;
pub use parsers::extract;
pub use types::{AnchorPlacement, Boilerplate, Dialect, Strategy};

use passbook_core::TransactionRecord;

/// Acquire a PDF and extract its records in one step.
///
/// Document-level failures surface as `AcquireError`; an empty `Vec` means the
/// text held no recognizable records.
pub fn read_statement(
    source: &PdfSource,
    opts: &AcquireOptions,
    dialect: &Dialect,
    strategy: Strategy,
) -> Result<Vec<TransactionRecord>, AcquireError> {
    let acquired = acquire_pdf(source, opts)?;
    Ok(extract(&acquired.pages, dialect, strategy))
}
