//! Tabular writers: CSV (UTF-8, header row) and a single-sheet XLSX workbook.
//!
//! Columns: Date & Time, Transaction Details, [Transaction ID], UTR No, Type, Amount, [Category]

use std::fmt;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use passbook_core::{TransactionRecord, FALLBACK_CATEGORY};
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Xlsx,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Xlsx => "xlsx",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "xlsx" | "excel" => Ok(OutputFormat::Xlsx),
            other => bail!("unknown output format: {other} (expected csv or xlsx)"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub include_transaction_id: bool,
    pub include_category: bool,
    /// Prefix ids with `'` in CSV so spreadsheet tools keep them as text
    pub excel_safe_ids: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_transaction_id: true,
            include_category: true,
            excel_safe_ids: true,
        }
    }
}

/// One output cell
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    fn to_csv(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format!("{n:.2}"),
        }
    }
}

pub fn columns(opts: &ExportOptions) -> Vec<&'static str> {
    let mut cols = vec!["Date & Time", "Transaction Details"];
    if opts.include_transaction_id {
        cols.push("Transaction ID");
    }
    cols.extend(["UTR No", "Type", "Amount"]);
    if opts.include_category {
        cols.push("Category");
    }
    cols
}

fn row(r: &TransactionRecord, opts: &ExportOptions, quote_ids: bool) -> Vec<Cell> {
    let id = |s: &str| {
        if quote_ids && !s.is_empty() {
            Cell::Text(format!("'{s}"))
        } else {
            Cell::Text(s.to_string())
        }
    };

    let mut cells = vec![
        Cell::Text(r.timestamp_text.clone()),
        Cell::Text(r.details.clone()),
    ];
    if opts.include_transaction_id {
        cells.push(id(&r.secondary_id));
    }
    cells.push(id(&r.reference_id));
    cells.push(Cell::Text(r.direction.label().to_string()));
    cells.push(Cell::Number(r.amount));
    if opts.include_category {
        cells.push(Cell::Text(r.category_or(FALLBACK_CATEGORY).to_string()));
    }
    cells
}

pub fn write_csv<W: Write>(records: &[TransactionRecord], writer: W, opts: &ExportOptions) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(columns(opts))?;
    for r in records {
        let cells: Vec<String> = row(r, opts, opts.excel_safe_ids).iter().map(Cell::to_csv).collect();
        wtr.write_record(&cells)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_xlsx<W: Write + Seek>(records: &[TransactionRecord], writer: W, opts: &ExportOptions) -> Result<()> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, String); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("xl/workbook.xml", WORKBOOK.to_string()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        ("xl/worksheets/sheet1.xml", sheet_xml(records, opts)),
    ];
    for (name, body) in parts {
        zip.start_file(name, options)
            .with_context(|| format!("writing {name}"))?;
        zip.write_all(body.as_bytes())?;
    }
    zip.finish()?;
    Ok(())
}

/// Write `records` next to `base` with the format's extension; refuses an empty set.
pub fn write_file(
    records: &[TransactionRecord],
    base: &Path,
    format: OutputFormat,
    opts: &ExportOptions,
) -> Result<PathBuf> {
    if records.is_empty() {
        bail!("No transactions parsed.");
    }

    let path = base.with_extension(format.extension());
    let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
    let written = match format {
        OutputFormat::Csv => write_csv(records, file, opts),
        OutputFormat::Xlsx => write_xlsx(records, file, opts),
    };
    written.with_context(|| format!("write {}", path.display()))?;

    info!(path = %path.display(), rows = records.len(), %format, "wrote output");
    Ok(path)
}

fn sheet_xml(records: &[TransactionRecord], opts: &ExportOptions) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    let header: Vec<Cell> = columns(opts)
        .into_iter()
        .map(|c| Cell::Text(c.to_string()))
        .collect();
    push_row(&mut xml, 1, &header);
    for (i, r) in records.iter().enumerate() {
        // ids are stored as text cells, no quote prefix needed
        push_row(&mut xml, i + 2, &row(r, opts, false));
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn push_row(xml: &mut String, row_num: usize, cells: &[Cell]) {
    xml.push_str(&format!(r#"<row r="{row_num}">"#));
    for (col, cell) in cells.iter().enumerate() {
        let reference = format!("{}{row_num}", column_letter(col));
        match cell {
            Cell::Text(s) => xml.push_str(&format!(
                r#"<c r="{reference}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                xml_escape(s)
            )),
            Cell::Number(n) => xml.push_str(&format!(r#"<c r="{reference}"><v>{n}</v></c>"#)),
        }
    }
    xml.push_str("</row>");
}

fn column_letter(idx: usize) -> String {
    let mut n = idx + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    out.iter().rev().collect()
}

/// Escape markup and drop characters XML 1.0 cannot carry
fn xml_escape(s: &str) -> String {
    let carried: String = s
        .chars()
        .filter(|c| matches!(c, '\t' | '\n' | '\r') || !c.is_control())
        .collect();
    escape(carried.as_str()).into_owned()
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Transactions" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use passbook_core::Direction;
    use std::io::{Cursor, Read};

    fn sample() -> Vec<TransactionRecord> {
        let mut a = TransactionRecord::new("451234567890");
        a.timestamp_text = "Jun 03, 2025 10:15 AM".to_string();
        a.details = "Kirana & Sons <Store>".to_string();
        a.secondary_id = "T2506031015".to_string();
        a.direction = Direction::Debit;
        a.amount = 1234.5;
        a.category = Some("Groceries".to_string());

        let b = TransactionRecord::new("U2");
        vec![a, b]
    }

    #[test]
    fn test_columns() {
        assert_eq!(
            columns(&ExportOptions::default()),
            vec!["Date & Time", "Transaction Details", "Transaction ID", "UTR No", "Type", "Amount", "Category"]
        );
        let minimal = ExportOptions {
            include_transaction_id: false,
            include_category: false,
            excel_safe_ids: false,
        };
        assert_eq!(
            columns(&minimal),
            vec!["Date & Time", "Transaction Details", "UTR No", "Type", "Amount"]
        );
    }

    #[test]
    fn test_csv_output() {
        let mut buf = Vec::new();
        write_csv(&sample(), &mut buf, &ExportOptions::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Date & Time,Transaction Details,Transaction ID,UTR No,Type,Amount,Category");
        assert_eq!(
            lines[1],
            "\"Jun 03, 2025 10:15 AM\",Kirana & Sons <Store>,'T2506031015,'451234567890,Debit,1234.50,Groceries"
        );
        // unknown direction: empty type, zero amount, fallback category, empty id unquoted
        assert_eq!(lines[2], ",,,'U2,,0.00,Uncategorized");
    }

    #[test]
    fn test_csv_without_quoted_ids() {
        let opts = ExportOptions {
            excel_safe_ids: false,
            ..ExportOptions::default()
        };
        let mut buf = Vec::new();
        write_csv(&sample(), &mut buf, &opts).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains(",T2506031015,451234567890,"));
    }

    #[test]
    fn test_xlsx_output() {
        let mut cursor = Cursor::new(Vec::new());
        write_xlsx(&sample(), &mut cursor, &ExportOptions::default()).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        for part in ["[Content_Types].xml", "_rels/.rels", "xl/workbook.xml", "xl/_rels/workbook.xml.rels"] {
            assert!(archive.by_name(part).is_ok(), "missing {part}");
        }

        let mut sheet = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut sheet)
            .unwrap();
        assert!(sheet.contains(r#"<c r="A1" t="inlineStr"><is><t xml:space="preserve">Date &amp; Time</t></is></c>"#));
        assert!(sheet.contains("Kirana &amp; Sons &lt;Store&gt;"));
        assert!(sheet.contains(r#"<c r="F2"><v>1234.5</v></c>"#));
        assert!(sheet.contains(">451234567890<"));
        assert!(!sheet.contains("'451234567890"));
    }

    #[test]
    fn test_write_file_sets_extension_and_refuses_empty() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("phonepe_transactions");

        let path = write_file(&sample(), &base, OutputFormat::Csv, &ExportOptions::default()).unwrap();
        assert_eq!(path, dir.path().join("phonepe_transactions.csv"));
        assert!(path.exists());

        let xlsx = write_file(&sample(), &base, OutputFormat::Xlsx, &ExportOptions::default()).unwrap();
        assert_eq!(xlsx.extension().unwrap(), "xlsx");

        let err = write_file(&[], &base, OutputFormat::Csv, &ExportOptions::default()).unwrap_err();
        assert!(err.to_string().contains("No transactions parsed"));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("Excel".parse::<OutputFormat>().unwrap(), OutputFormat::Xlsx);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(6), "G");
        assert_eq!(column_letter(26), "AA");
    }

    #[test]
    fn test_xml_escape_drops_control() {
        assert_eq!(xml_escape("a\u{0001}b\"c'"), "ab&quot;c&apos;");
    }
}
