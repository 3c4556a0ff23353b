//! Turning acquired page text into the two shapes the parsers consume:
//! one concatenated blob, or an ordered list of trimmed, filtered lines.

use crate::types::Dialect;

/// Replace renderer-substituted characters with a literal colon
pub fn normalize_colons(text: &str, substitutes: &[char]) -> String {
    if substitutes.is_empty() {
        return text.to_string();
    }
    text.chars()
        .map(|c| if substitutes.contains(&c) { ':' } else { c })
        .collect()
}

/// All pages joined with newlines, colon artifacts normalized
pub fn to_blob(pages: &[String], dialect: &Dialect) -> String {
    let joined = pages.join("\n");
    normalize_colons(&joined, &dialect.colon_substitutes)
}

/// Non-empty trimmed lines across all pages, boilerplate removed
pub fn to_lines(pages: &[String], dialect: &Dialect) -> Vec<String> {
    let mut out = Vec::new();
    for page in pages {
        let page = normalize_colons(page, &dialect.colon_substitutes);
        for raw in page.lines() {
            let line = raw.trim();
            if line.is_empty() || dialect.boilerplate.is_boilerplate(line) {
                continue;
            }
            out.push(line.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_colons() {
        assert_eq!(normalize_colons("10\u{f03a}15 AM", &['\u{f03a}']), "10:15 AM");
        assert_eq!(normalize_colons("10\u{f03a}15", &[]), "10\u{f03a}15");
    }

    #[test]
    fn test_to_lines_filters_boilerplate() {
        let d = Dialect::phonepe().unwrap();
        let pages = vec![
            "Date Transaction Details Type Amount\n  Jun 03, 2025 Paid to X Debit INR 5.00  \n\n10\u{f03a}15 AM Transaction ID : T1\nPage 1 of 2".to_string(),
            "UTR No : 123\nhttps://support.phonepe.com\n".to_string(),
        ];
        let lines = to_lines(&pages, &d);
        assert_eq!(
            lines,
            vec![
                "Jun 03, 2025 Paid to X Debit INR 5.00",
                "10:15 AM Transaction ID : T1",
                "UTR No : 123",
            ]
        );
    }

    #[test]
    fn test_to_blob_joins_pages() {
        let d = Dialect::phonepe().unwrap();
        let blob = to_blob(&["a\u{f03a}b".to_string(), "c".to_string()], &d);
        assert_eq!(blob, "a:b\nc");
    }
}
