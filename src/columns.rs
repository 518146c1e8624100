//! Column-letter arithmetic and range resolution.

use crate::config::{ConfigValue, SheetConfig};
use crate::error::{Error, Result};
use crate::xlsx::Worksheet;

/// Convert spreadsheet-style column letters to a 1-based column number.
///
/// Base-26 with no zero digit: `A` = 1, `Z` = 26, `AA` = 27. Input is
/// expected to be uppercase; no validation is performed. Absurdly long
/// inputs saturate instead of overflowing.
pub fn column_to_number(letters: &str) -> u32 {
    let mut number: i64 = 0;
    for c in letters.chars() {
        number = number
            .saturating_mul(26)
            .saturating_add(c as i64 - 'A' as i64 + 1);
    }
    number.clamp(0, i64::from(u32::MAX)) as u32
}

/// Parse a textual column range like `"A:C"` into 1-based column numbers.
///
/// The string must split into exactly two colon-separated parts. A range
/// whose start lies past its end, or with an empty side, yields an empty
/// sequence, not an error.
pub fn parse_column_range(range: &str) -> Result<Vec<u32>> {
    let parts: Vec<&str> = range.split(':').collect();

    if parts.len() != 2 {
        return Err(Error::ColumnRange(range.to_string()));
    }

    if parts[0].is_empty() || parts[1].is_empty() {
        return Ok(Vec::new());
    }

    let start = column_to_number(parts[0]);
    let end = column_to_number(parts[1]);

    Ok((start..=end).collect())
}

/// Resolve the effective column selection for a worksheet.
///
/// - `cols` absent: the contiguous ascending range over the worksheet's
///   used column bounds (empty for a sheet with no used cells).
/// - explicit index list: returned as-is, order preserved.
/// - range string: parsed via [`parse_column_range`].
/// - any other value: empty selection, silently.
pub fn resolve_columns(config: &SheetConfig, sheet: &Worksheet) -> Result<Vec<u32>> {
    match config.get("cols") {
        None => Ok(sheet
            .used_columns()
            .map(|(first, last)| (first..=last).collect())
            .unwrap_or_default()),
        Some(ConfigValue::IntList(cols)) => Ok(cols.clone()),
        Some(ConfigValue::Text(range)) => parse_column_range(range),
        Some(_) => Ok(Vec::new()),
    }
}
