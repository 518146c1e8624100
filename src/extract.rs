//! Configuration-driven extraction of headers and body rows.
//!
//! Extraction never fails as a whole once the workbook is open: each
//! configured worksheet either contributes a result entry or at least one
//! error string. Open-level failures short-circuit with a single error and
//! an empty result.

use crate::columns::resolve_columns;
use crate::config::{ExtractConfig, SheetConfig};
use crate::error::{Error, Result};
use crate::value::CellValue;
use crate::xlsx::{Workbook, Worksheet};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;

/// Extracted headers and body rows for one worksheet.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SheetData {
    /// Header cell text, in column-selection order. Empty when the sheet is
    /// configured without headers.
    pub headers: Vec<String>,
    /// Body rows; each row holds one coerced value per selected column.
    pub rows: Vec<Vec<CellValue>>,
}

/// The outcome of an extraction run.
///
/// Partial success is a first-class outcome: inspect `errors` even when
/// `worksheets` is non-empty.
#[derive(Debug, Default, Serialize)]
pub struct Extraction {
    /// Per-worksheet results, keyed by name, in configuration order.
    pub worksheets: IndexMap<String, SheetData>,
    /// Human-readable error messages, one per failure.
    pub errors: Vec<String>,
}

impl Extraction {
    fn open_failed(err: Error) -> Self {
        tracing::warn!(error = %err, "failed to open workbook");
        Self {
            worksheets: IndexMap::new(),
            errors: vec![format!("Error opening workbook: {}", err)],
        }
    }
}

/// Extract every configured worksheet from an opened workbook.
///
/// Worksheets are processed in configuration order. A failure in one
/// worksheet is recorded as an error string and never affects the others.
pub fn extract(workbook: &Workbook, config: &ExtractConfig) -> Extraction {
    let mut extraction = Extraction::default();

    for (name, sheet_config) in config {
        tracing::debug!(sheet = %name, "extracting worksheet");
        match extract_sheet(workbook, name, sheet_config) {
            Ok(data) => {
                extraction.worksheets.insert(name.clone(), data);
            }
            Err(err @ Error::SheetNotFound(_)) => {
                tracing::warn!(sheet = %name, "worksheet not found");
                extraction.errors.push(err.to_string());
            }
            Err(err) => {
                tracing::warn!(sheet = %name, error = %err, "failed to read worksheet");
                extraction
                    .errors
                    .push(format!("Error reading worksheet '{}': {}", name, err));
            }
        }
    }

    extraction
}

/// Extract a workbook held in a byte buffer.
///
/// An unreadable workbook yields an empty result and a single error entry.
pub fn extract_bytes(data: Vec<u8>, config: &ExtractConfig) -> Extraction {
    match Workbook::from_bytes(data) {
        Ok(workbook) => extract(&workbook, config),
        Err(err) => Extraction::open_failed(err),
    }
}

/// Extract a workbook from a file on disk.
pub fn extract_file(path: impl AsRef<Path>, config: &ExtractConfig) -> Extraction {
    match Workbook::open(path) {
        Ok(workbook) => extract(&workbook, config),
        Err(err) => Extraction::open_failed(err),
    }
}

/// Extract a workbook from an async reader, buffering it fully first.
#[cfg(feature = "async")]
pub async fn extract_reader<R>(mut reader: R, config: &ExtractConfig) -> Extraction
where
    R: tokio::io::AsyncRead + Unpin,
{
    use tokio::io::AsyncReadExt;

    let mut data = Vec::new();
    match reader.read_to_end(&mut data).await {
        Ok(_) => extract_bytes(data, config),
        Err(err) => Extraction::open_failed(Error::Io(err)),
    }
}

impl Workbook {
    /// Extract every configured worksheet. See [`extract`].
    pub fn extract(&self, config: &ExtractConfig) -> Extraction {
        extract(self, config)
    }
}

/// Extract one worksheet as an explicit result.
fn extract_sheet(workbook: &Workbook, name: &str, config: &SheetConfig) -> Result<SheetData> {
    let sheet = workbook.worksheet(name)?;
    let columns = resolve_columns(config, &sheet)?;

    Ok(SheetData {
        headers: read_headers(&sheet, config, &columns),
        rows: read_body(&sheet, config, &columns),
    })
}

/// Read header text for the selected columns at the configured header row.
fn read_headers(sheet: &Worksheet, config: &SheetConfig, columns: &[u32]) -> Vec<String> {
    if !config.bool_or("hasHeaders", true) {
        return Vec::new();
    }

    let header_row = u32::try_from(config.int_or("headerRow", 0)).unwrap_or(0);
    columns
        .iter()
        .map(|&col| sheet.cell_text(header_row, col))
        .collect()
}

/// Read and filter body rows for the selected columns.
///
/// `bodyRow` is an offset from the first used row, not an absolute row
/// number, and it shortens the span from both ends: the iteration starts
/// `bodyRow` rows past the first used row, and the span length is
/// `(last - first) - bodyRow`. Rows whose every value is null are dropped.
fn read_body(sheet: &Worksheet, config: &SheetConfig, columns: &[u32]) -> Vec<Vec<CellValue>> {
    let Some((first, last)) = sheet.used_rows() else {
        return Vec::new();
    };

    let body_row = config.int_or("bodyRow", 0);
    let start = i64::from(first) + body_row;
    let count = (i64::from(last) - i64::from(first)) - body_row;

    let mut rows = Vec::new();
    for offset in 0..count.max(0) {
        let Ok(row) = u32::try_from(start + offset) else {
            continue;
        };

        let values: Vec<CellValue> = columns.iter().map(|&col| sheet.value(row, col)).collect();
        if values.iter().any(|v| !v.is_null()) {
            rows.push(values);
        }
    }

    rows
}
