//! CSV decoding, parsing and cell normalization.

use crate::error::{AdminError, AdminResult};
use csv::ReaderBuilder;

/// Cell tokens, compared case-insensitively, that stand for a missing value.
pub const MISSING_VALUE_TOKENS: &[&str] = &["na", "n/a"];

/// A parsed row: one entry per cell, `None` for missing values.
pub type CsvRow = Vec<Option<String>>;

/// Parsing options for uploaded files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CsvOptions {
    /// Treat the first line as a header and skip it. Off by default: every line is data.
    pub has_header: bool,
}

impl CsvOptions {
    pub fn with_header() -> Self {
        Self { has_header: true }
    }
}

/// A decoded upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCsv {
    /// Header names, present only when parsed with `has_header`.
    pub header: Option<Vec<String>>,
    pub rows: Vec<CsvRow>,
}

/// Decode uploaded bytes as UTF-8.
pub fn decode_utf8(bytes: &[u8]) -> AdminResult<&str> {
    std::str::from_utf8(bytes).map_err(|e| {
        AdminError::encoding(format!(
            "Uploaded file is not valid UTF-8 (invalid byte at offset {})",
            e.valid_up_to()
        ))
    })
}

/// True for an empty cell or a case-insensitive `na` / `n/a`.
pub fn is_missing_value(cell: &str) -> bool {
    cell.is_empty()
        || MISSING_VALUE_TOKENS
            .iter()
            .any(|token| cell.eq_ignore_ascii_case(token))
}

/// Map missing-value tokens to `None`; keep every other cell verbatim.
pub fn normalize_cell(cell: &str) -> Option<String> {
    if is_missing_value(cell) {
        None
    } else {
        Some(cell.to_string())
    }
}

/// Decode and parse an uploaded comma-separated file.
///
/// Rows keep whatever width they were written with; matching them against the
/// target table is left to the loader.
pub fn parse_csv(bytes: &[u8], options: CsvOptions) -> AdminResult<ParsedCsv> {
    let text = decode_utf8(bytes)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .has_headers(options.has_header)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header = if options.has_header {
        let header = reader.headers().map_err(csv_error)?;
        Some(header.iter().map(String::from).collect())
    } else {
        None
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        rows.push(record.iter().map(normalize_cell).collect());
    }

    Ok(ParsedCsv { header, rows })
}

fn csv_error(err: csv::Error) -> AdminError {
    let line = err.position().map(|p| p.line());
    match line {
        Some(line) => AdminError::validation(format!("Malformed CSV at line {}: {}", line, err)),
        None => AdminError::validation(format!("Malformed CSV: {}", err)),
    }
}
