//! Text acquisition: direct extraction first, decryption only when needed.
//!
//! A decrypted document is staged as a temporary plaintext copy and re-loaded
//! from it. The copy lives inside a `DecryptedCopy` guard and is removed when
//! the guard drops, on success and on every error path.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::document::{LopdfDocument, PdfSource, StatementDocument};
use crate::error::{AcquireError, Result};

#[derive(Debug, Clone, Default)]
pub struct AcquireOptions {
    pub password: Option<String>,
    /// Directory for decrypted copies (system temp dir when `None`)
    pub temp_dir: Option<PathBuf>,
}

impl AcquireOptions {
    fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

/// Raw text of every page, in page order
#[derive(Debug, Clone, PartialEq)]
pub struct Acquired {
    pub pages: Vec<String>,
    /// True when the text came from a decrypted copy
    pub decrypted: bool,
}

impl Acquired {
    pub fn has_text(&self) -> bool {
        self.pages.iter().any(|p| !p.trim().is_empty())
    }
}

/// Scoped plaintext copy of a decrypted document
#[derive(Debug)]
pub struct DecryptedCopy {
    file: NamedTempFile,
}

impl DecryptedCopy {
    pub fn stage<D: StatementDocument>(doc: &mut D, dir: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("passbook-").suffix(".pdf");
        let mut file = match dir {
            Some(d) => builder.tempfile_in(d)?,
            None => builder.tempfile()?,
        };
        doc.save_to(file.as_file_mut())?;
        debug!(path = %file.path().display(), "staged decrypted copy");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Extract page text, decrypting with `opts.password` when the document needs it.
pub fn acquire<D: StatementDocument>(source: &PdfSource, opts: &AcquireOptions) -> Result<Acquired> {
    let bytes = source.read()?;
    let mut doc = D::load(&bytes)?;

    if !doc.is_encrypted() {
        return Ok(Acquired { pages: extract_pages(&doc), decrypted: false });
    }

    match opts.password() {
        Some(password) => doc.decrypt(password)?,
        None => {
            decrypt_without_password(&mut doc)?;
            info!(source = %source.describe(), "encrypted document opened with empty user password");
        }
    }

    let copy = DecryptedCopy::stage(&mut doc, opts.temp_dir.as_deref())?;
    let plain = D::load(&fs::read(copy.path())?)?;
    let pages = extract_pages(&plain);
    info!(source = %source.describe(), pages = pages.len(), "extracted text from decrypted copy");

    Ok(Acquired { pages, decrypted: true })
}

/// `acquire` with the `lopdf` backend
pub fn acquire_pdf(source: &PdfSource, opts: &AcquireOptions) -> Result<Acquired> {
    acquire::<LopdfDocument>(source, opts)
}

/// Write a decrypted copy of `source` to `out`.
///
/// Unencrypted input is copied unchanged. Returns whether decryption happened.
pub fn unlock_to<D: StatementDocument>(
    source: &PdfSource,
    password: Option<&str>,
    out: &Path,
) -> Result<bool> {
    let bytes = source.read()?;
    let mut doc = D::load(&bytes)?;
    if !doc.is_encrypted() {
        fs::write(out, &bytes)?;
        return Ok(false);
    }

    match password.filter(|p| !p.is_empty()) {
        Some(password) => doc.decrypt(password)?,
        None => decrypt_without_password(&mut doc)?,
    }

    let mut file = fs::File::create(out)?;
    doc.save_to(&mut file)?;
    Ok(true)
}

/// Owner-password-only documents open with the empty user password; anything
/// else needs a password from the caller.
fn decrypt_without_password<D: StatementDocument>(doc: &mut D) -> Result<()> {
    doc.decrypt("").map_err(|e| match e {
        AcquireError::IncorrectPassword => AcquireError::PasswordRequired,
        other => other,
    })
}

/// Per-page failures contribute nothing instead of aborting the document
fn extract_pages<D: StatementDocument>(doc: &D) -> Vec<String> {
    let mut pages = Vec::new();
    for page in doc.page_numbers() {
        match doc.page_text(page) {
            Ok(text) => pages.push(text),
            Err(e) => warn!(page, error = %e, "page text extraction failed; skipping page"),
        }
    }
    pages
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// In-memory stand-in for a PDF.
    ///
    /// Serialized form (UTF-8): optional header lines `password:<pw>` and
    /// `corrupt-on-save`, a `---` separator, then pages separated by form feeds.
    /// A page reading `!fail` errors on extraction. Encrypted pages yield no
    /// text until decrypted.
    #[derive(Debug)]
    pub(crate) struct FakeDocument {
        password: Option<String>,
        unlocked: bool,
        corrupt_on_save: bool,
        pages: Vec<String>,
    }

    pub(crate) fn fake_bytes(password: Option<&str>, pages: &[&str]) -> Vec<u8> {
        let mut s = String::new();
        if let Some(pw) = password {
            s.push_str(&format!("password:{pw}\n"));
        }
        s.push_str("---\n");
        s.push_str(&pages.join("\u{000c}"));
        s.into_bytes()
    }

    impl StatementDocument for FakeDocument {
        fn load(bytes: &[u8]) -> Result<Self> {
            let s = std::str::from_utf8(bytes)
                .map_err(|e| AcquireError::Unreadable(e.to_string()))?;
            let (header, body) = s
                .split_once("---\n")
                .ok_or_else(|| AcquireError::Unreadable("missing separator".to_string()))?;

            let mut password = None;
            let mut corrupt_on_save = false;
            for line in header.lines() {
                if let Some(pw) = line.strip_prefix("password:") {
                    password = Some(pw.to_string());
                } else if line == "corrupt-on-save" {
                    corrupt_on_save = true;
                }
            }
            Ok(Self {
                password,
                unlocked: false,
                corrupt_on_save,
                pages: body.split('\u{000c}').map(str::to_string).collect(),
            })
        }

        fn is_encrypted(&self) -> bool {
            self.password.is_some()
        }

        fn decrypt(&mut self, password: &str) -> Result<()> {
            match &self.password {
                Some(pw) if pw == password => {
                    self.unlocked = true;
                    Ok(())
                }
                Some(_) => Err(AcquireError::IncorrectPassword),
                None => Err(AcquireError::Decryption("document is not encrypted".into())),
            }
        }

        fn page_numbers(&self) -> Vec<u32> {
            (1..=self.pages.len() as u32).collect()
        }

        fn page_text(&self, page: u32) -> anyhow::Result<String> {
            let text = &self.pages[(page - 1) as usize];
            if text == "!fail" {
                anyhow::bail!("broken content stream on page {page}");
            }
            if self.password.is_some() && !self.unlocked {
                return Ok(String::new());
            }
            Ok(text.clone())
        }

        fn save_to(&mut self, file: &mut fs::File) -> Result<()> {
            if self.corrupt_on_save {
                file.write_all(b"garbage")?;
                return Ok(());
            }
            let pages: Vec<&str> = self.pages.iter().map(String::as_str).collect();
            file.write_all(&fake_bytes(None, &pages))?;
            Ok(())
        }
    }

    fn opts_in(dir: &Path, password: Option<&str>) -> AcquireOptions {
        AcquireOptions {
            password: password.map(str::to_string),
            temp_dir: Some(dir.to_path_buf()),
        }
    }

    fn dir_is_empty(dir: &Path) -> bool {
        fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn test_plain_document() {
        let src = PdfSource::Bytes(fake_bytes(None, &["page one", "page two"]));
        let got = acquire::<FakeDocument>(&src, &AcquireOptions::default()).unwrap();
        assert_eq!(got.pages, vec!["page one", "page two"]);
        assert!(!got.decrypted);
    }

    #[test]
    fn test_failed_page_is_skipped() {
        let src = PdfSource::Bytes(fake_bytes(None, &["one", "!fail", "three"]));
        let got = acquire::<FakeDocument>(&src, &AcquireOptions::default()).unwrap();
        assert_eq!(got.pages, vec!["one", "three"]);
    }

    #[test]
    fn test_correct_password_matches_plain_text() {
        let scratch = tempfile::tempdir().unwrap();
        let pages = ["UTR No : A1 Paid to X DEBIT 5", "UTR No : B2"];

        let plain = acquire::<FakeDocument>(
            &PdfSource::Bytes(fake_bytes(None, &pages)),
            &AcquireOptions::default(),
        )
        .unwrap();
        let unlocked = acquire::<FakeDocument>(
            &PdfSource::Bytes(fake_bytes(Some("s3cret"), &pages)),
            &opts_in(scratch.path(), Some("s3cret")),
        )
        .unwrap();

        assert!(unlocked.decrypted);
        assert_eq!(unlocked.pages, plain.pages);
        assert!(dir_is_empty(scratch.path()), "decrypted copy left behind");
    }

    #[test]
    fn test_missing_and_incorrect_password_are_distinct() {
        let scratch = tempfile::tempdir().unwrap();
        let src = PdfSource::Bytes(fake_bytes(Some("s3cret"), &["text"]));

        let missing = acquire::<FakeDocument>(&src, &opts_in(scratch.path(), None)).unwrap_err();
        assert!(matches!(missing, AcquireError::PasswordRequired));

        let empty = acquire::<FakeDocument>(&src, &opts_in(scratch.path(), Some(""))).unwrap_err();
        assert!(matches!(empty, AcquireError::PasswordRequired));

        let wrong = acquire::<FakeDocument>(&src, &opts_in(scratch.path(), Some("nope"))).unwrap_err();
        assert!(matches!(wrong, AcquireError::IncorrectPassword));
        assert!(wrong.is_password_error());

        assert!(dir_is_empty(scratch.path()));
    }

    #[test]
    fn test_decrypted_copy_removed_when_reload_fails() {
        let scratch = tempfile::tempdir().unwrap();
        let mut bytes = b"corrupt-on-save\n".to_vec();
        bytes.extend(fake_bytes(Some("pw"), &["text"]));

        let err = acquire::<FakeDocument>(&PdfSource::Bytes(bytes), &opts_in(scratch.path(), Some("pw")))
            .unwrap_err();
        assert!(matches!(err, AcquireError::Unreadable(_)));
        assert!(dir_is_empty(scratch.path()), "decrypted copy left behind after failure");
    }

    #[test]
    fn test_owner_only_document_opens_without_password() {
        let scratch = tempfile::tempdir().unwrap();
        let src = PdfSource::Bytes(fake_bytes(Some(""), &["UTR No : A1"]));

        let got = acquire::<FakeDocument>(&src, &opts_in(scratch.path(), None)).unwrap();
        assert!(got.decrypted);
        assert_eq!(got.pages, vec!["UTR No : A1"]);
        assert!(dir_is_empty(scratch.path()));
    }

    #[test]
    fn test_unreadable_document() {
        let err = acquire::<FakeDocument>(
            &PdfSource::Bytes(b"no separator".to_vec()),
            &AcquireOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AcquireError::Unreadable(_)));
    }

    #[test]
    fn test_unlock_to_writes_plain_copy() {
        let scratch = tempfile::tempdir().unwrap();
        let out = scratch.path().join("unlocked.pdf");
        let src = PdfSource::Bytes(fake_bytes(Some("pw"), &["hello"]));

        assert!(matches!(
            unlock_to::<FakeDocument>(&src, None, &out).unwrap_err(),
            AcquireError::PasswordRequired
        ));
        assert!(unlock_to::<FakeDocument>(&src, Some("pw"), &out).unwrap());

        let reread = acquire::<FakeDocument>(&PdfSource::Path(out), &AcquireOptions::default()).unwrap();
        assert_eq!(reread.pages, vec!["hello"]);
        assert!(!reread.decrypted);
    }

    #[test]
    fn test_lopdf_backend_plain_pdf() {
        let bytes = crate::document::tests::build_pdf(&["UTR No : ABC123"]);
        let got = acquire_pdf(&PdfSource::Bytes(bytes), &AcquireOptions::default()).unwrap();
        assert_eq!(got.pages.len(), 1);
        assert!(got.has_text());
    }
}
