use anyhow::{Context, Result};
use passbook_core::TransactionRecord;
use passbook_finance::{write_file, OutputFormat, Summary};
use passbook_ingest::text::to_lines;
use passbook_ingest::{
    acquire_pdf, read_statement, unlock_to, AcquireError, Dialect, LopdfDocument, PdfSource, Strategy,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::report::{print_preview, print_summary};
use crate::state::output_base;

/// Input selection shared by the commands that read a statement
#[derive(Debug, Clone)]
pub struct SourceOpts {
    pub pdf: PathBuf,
    pub password: Option<String>,
    pub dialect: Option<String>,
    pub strategy: Option<Strategy>,
}

impl SourceOpts {
    fn dialect(&self, cfg: &Config) -> Result<Dialect> {
        Dialect::by_name(self.dialect.as_deref().unwrap_or(&cfg.dialect))
    }

    fn source(&self) -> Result<PdfSource> {
        if !self.pdf.exists() {
            anyhow::bail!("PDF not found: {}", self.pdf.display());
        }
        Ok(PdfSource::Path(self.pdf.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct ConvertOpts {
    pub out: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub no_category: bool,
    pub no_transaction_id: bool,
    pub summary: bool,
    pub preview: usize,
}

/// Acquire + extract, with password problems turned into actionable messages
fn load_records(src: &SourceOpts, cfg: &Config) -> Result<Vec<TransactionRecord>> {
    let dialect = src.dialect(cfg)?;
    let strategy = src.strategy.unwrap_or(cfg.strategy);
    let opts = cfg.acquire_options(src.password.clone());

    read_statement(&src.source()?, &opts, &dialect, strategy).map_err(|e| {
        let hint = if e.is_password_error() { " (pass the right --password)" } else { "" };
        anyhow::Error::new(e).context(format!("reading {}{hint}", src.pdf.display()))
    })
}

pub fn convert(src: &SourceOpts, opts: &ConvertOpts, cfg: &Config) -> Result<()> {
    let mut records = load_records(src, cfg)?;
    if records.is_empty() {
        warn!(pdf = %src.pdf.display(), "No transactions found; PDF structure may differ from the selected dialect");
        return Ok(());
    }

    let categorize = cfg.categorize && !opts.no_category;
    let rules = cfg.category_rules();
    if categorize {
        rules.apply(&mut records);
    }

    print_preview(&records, opts.preview);

    let mut export = cfg.export_options();
    export.include_category = categorize;
    export.include_transaction_id = cfg.include_transaction_id && !opts.no_transaction_id;
    let format = opts.format.unwrap_or(cfg.format);

    let path = write_file(
        &records,
        &output_base(&src.pdf, opts.out.as_deref()),
        format,
        &export,
    )?;
    println!("Wrote {} transactions to {}", records.len(), path.display());

    if opts.summary {
        println!();
        print_summary(&Summary::from_records(&records, &rules));
    }
    Ok(())
}

pub fn summary(src: &SourceOpts, json: bool, cfg: &Config) -> Result<()> {
    let mut records = load_records(src, cfg)?;
    if records.is_empty() {
        warn!(pdf = %src.pdf.display(), "No transactions found");
        return Ok(());
    }

    let rules = cfg.category_rules();
    rules.apply(&mut records);
    let summary = Summary::from_records(&records, &rules);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Print the filtered lines the line strategy would see
pub fn lines(src: &SourceOpts, cfg: &Config) -> Result<()> {
    let dialect = src.dialect(cfg)?;
    let acquired = acquire_pdf(&src.source()?, &cfg.acquire_options(src.password.clone()))
        .with_context(|| format!("reading {}", src.pdf.display()))?;

    if !acquired.has_text() {
        warn!(pdf = %src.pdf.display(), "no text extracted; the PDF may be scanned images");
        return Ok(());
    }
    for line in to_lines(&acquired.pages, &dialect) {
        println!("{line}");
    }
    Ok(())
}

pub fn unlock(pdf: &Path, password: Option<&str>, out: &Path) -> Result<()> {
    let source = PdfSource::Path(pdf.to_path_buf());
    let decrypted = unlock_to::<LopdfDocument>(&source, password, out)
        .with_context(|| format!("unlocking {}", pdf.display()))?;

    if decrypted {
        info!(out = %out.display(), "decrypted copy written");
        println!("Wrote decrypted copy to {}", out.display());
    } else {
        println!("{} is not encrypted; copied to {}", pdf.display(), out.display());
    }
    Ok(())
}

pub fn dialects(cfg: &Config) -> Result<()> {
    for (name, is_default) in dialect_listing(cfg)? {
        let marker = if is_default { " (default)" } else { "" };
        println!("{name}{marker}");
    }
    Ok(())
}

/// Built-in dialect names, flagging the one the config selects (aliases resolved)
fn dialect_listing(cfg: &Config) -> Result<Vec<(String, bool)>> {
    let configured = Dialect::by_name(&cfg.dialect)?.name;
    Dialect::NAMES
        .iter()
        .map(|name| {
            let d = Dialect::by_name(name)?;
            let is_default = d.name == configured;
            Ok((d.name, is_default))
        })
        .collect()
}
