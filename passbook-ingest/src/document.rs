//! PDF collaborator: the narrow surface the acquisition step needs from a
//! PDF library, plus the `lopdf`-backed implementation.

use std::borrow::Cow;
use std::fs::{self, File};
use std::path::PathBuf;

use lopdf::encryption::DecryptionError;

use crate::error::{AcquireError, Result};

/// Where the statement bytes come from
#[derive(Debug, Clone)]
pub enum PdfSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl PdfSource {
    pub fn read(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            PdfSource::Path(p) => Ok(Cow::Owned(fs::read(p)?)),
            PdfSource::Bytes(b) => Ok(Cow::Borrowed(b.as_slice())),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            PdfSource::Path(p) => p.display().to_string(),
            PdfSource::Bytes(b) => format!("<{} bytes in memory>", b.len()),
        }
    }
}

/// A loaded statement document.
pub trait StatementDocument: Sized {
    fn load(bytes: &[u8]) -> Result<Self>;

    fn is_encrypted(&self) -> bool;

    /// Decrypt in place. Wrong password must map to `AcquireError::IncorrectPassword`.
    fn decrypt(&mut self, password: &str) -> Result<()>;

    /// 1-based page numbers in document order
    fn page_numbers(&self) -> Vec<u32>;

    fn page_text(&self, page: u32) -> anyhow::Result<String>;

    /// Serialize the (possibly decrypted) document
    fn save_to(&mut self, file: &mut File) -> Result<()>;
}

/// `lopdf` implementation
#[derive(Debug)]
pub struct LopdfDocument {
    doc: lopdf::Document,
}

impl StatementDocument for LopdfDocument {
    fn load(bytes: &[u8]) -> Result<Self> {
        let doc = lopdf::Document::load_mem(bytes)
            .map_err(|e| AcquireError::Unreadable(e.to_string()))?;
        Ok(Self { doc })
    }

    fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    fn decrypt(&mut self, password: &str) -> Result<()> {
        self.doc.decrypt(password).map_err(decryption_error)
    }

    fn page_numbers(&self) -> Vec<u32> {
        self.doc.get_pages().keys().copied().collect()
    }

    fn page_text(&self, page: u32) -> anyhow::Result<String> {
        Ok(self.doc.extract_text(&[page])?)
    }

    fn save_to(&mut self, file: &mut File) -> Result<()> {
        self.doc
            .save_to(file)
            .map_err(|e| AcquireError::Decryption(format!("writing decrypted copy: {e}")))
    }
}

fn decryption_error(e: lopdf::Error) -> AcquireError {
    match e {
        lopdf::Error::Decryption(DecryptionError::IncorrectPassword) => AcquireError::IncorrectPassword,
        other => AcquireError::Decryption(other.to_string()),
    }
}
