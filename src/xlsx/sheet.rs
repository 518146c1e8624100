//! Worksheet grid model and worksheet XML parsing.

use crate::columns::column_to_number;
use crate::error::{Error, Result};
use crate::value::{serial_to_datetime, serial_to_duration, CellValue};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;

use super::shared_strings::SharedStrings;
use super::styles::Styles;

/// Declared storage kind of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Cell entry with no value.
    Blank,
    /// Boolean cell (`t="b"`).
    Boolean,
    /// Date-formatted numeric cell, or an ISO date cell (`t="d"`).
    DateTime,
    /// Elapsed-time-formatted numeric cell.
    Duration,
    /// Plain numeric cell.
    Number,
    /// Shared, inline, or formula string cell.
    Text,
    /// Error cell (`t="e"`).
    Error,
}

/// A single cell: its declared kind and resolved textual payload.
///
/// Shared-string references are resolved at parse time, so `raw` always
/// holds the cell's own content.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Declared storage kind.
    pub kind: CellKind,
    /// Raw payload: serial number text, boolean flag, or string content.
    pub raw: String,
}

impl Cell {
    /// Coerce this cell to a typed value based on its declared kind.
    ///
    /// Total: unparseable payloads and unrecognized kinds degrade to
    /// [`CellValue::Null`] rather than erroring.
    pub fn coerce(&self) -> CellValue {
        match self.kind {
            CellKind::Blank | CellKind::Error => CellValue::Null,
            CellKind::Boolean => {
                CellValue::Bool(self.raw == "1" || self.raw.eq_ignore_ascii_case("true"))
            }
            CellKind::DateTime => match self.raw.parse::<f64>() {
                Ok(serial) => serial_to_datetime(serial)
                    .map(CellValue::DateTime)
                    .unwrap_or(CellValue::Null),
                Err(_) => parse_iso_datetime(&self.raw)
                    .map(CellValue::DateTime)
                    .unwrap_or(CellValue::Null),
            },
            CellKind::Duration => self
                .raw
                .parse::<f64>()
                .ok()
                .and_then(serial_to_duration)
                .map(CellValue::Duration)
                .unwrap_or(CellValue::Null),
            CellKind::Number => self
                .raw
                .parse::<f64>()
                .map(CellValue::Number)
                .unwrap_or(CellValue::Null),
            CellKind::Text => CellValue::Text(self.raw.clone()),
        }
    }
}

/// Coerce an optional cell reference; an absent cell is null.
pub fn coerce_cell(cell: Option<&Cell>) -> CellValue {
    cell.map(Cell::coerce).unwrap_or(CellValue::Null)
}

fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// A parsed worksheet: a sparse 1-based (row, column) cell grid.
///
/// The used range covers every cell entry present in the sheet XML,
/// including blank entries.
#[derive(Debug, Default)]
pub struct Worksheet {
    name: String,
    cells: HashMap<(u32, u32), Cell>,
    first_row: u32,
    last_row: u32,
    first_col: u32,
    last_col: u32,
}

impl Worksheet {
    /// Worksheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a cell by 1-based row and column.
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Coerced value of a cell; absent cells are null.
    pub fn value(&self, row: u32, col: u32) -> CellValue {
        coerce_cell(self.cell(row, col))
    }

    /// Textual representation of a cell; absent cells render empty.
    pub fn cell_text(&self, row: u32, col: u32) -> String {
        self.value(row, col).to_string()
    }

    /// First and last used row, if any cell entry exists.
    pub fn used_rows(&self) -> Option<(u32, u32)> {
        (!self.cells.is_empty()).then_some((self.first_row, self.last_row))
    }

    /// First and last used column, if any cell entry exists.
    pub fn used_columns(&self) -> Option<(u32, u32)> {
        (!self.cells.is_empty()).then_some((self.first_col, self.last_col))
    }

    fn insert(&mut self, row: u32, col: u32, cell: Cell) {
        if self.cells.is_empty() {
            self.first_row = row;
            self.last_row = row;
            self.first_col = col;
            self.last_col = col;
        } else {
            self.first_row = self.first_row.min(row);
            self.last_row = self.last_row.max(row);
            self.first_col = self.first_col.min(col);
            self.last_col = self.last_col.max(col);
        }
        self.cells.insert((row, col), cell);
    }

    /// Parse a worksheet from its XML part.
    pub(crate) fn parse(
        name: &str,
        xml: &str,
        shared_strings: &SharedStrings,
        styles: &Styles,
    ) -> Result<Self> {
        let mut sheet = Worksheet {
            name: name.to_string(),
            ..Default::default()
        };

        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut in_value = false;

        let mut current_row: u32 = 0;
        let mut current_col: u32 = 0;

        // In-flight cell state, finalized on </c> or an empty <c/>
        let mut cell_pos: Option<(u32, u32)> = None;
        let mut cell_type: Option<String> = None;
        let mut cell_style: Option<usize> = None;
        let mut cell_value: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e)) => match e.name().as_ref() {
                    b"row" => {
                        current_row += 1;
                        current_col = 0;
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"r" {
                                if let Ok(r) = String::from_utf8_lossy(&attr.value).parse() {
                                    current_row = r;
                                }
                            }
                        }
                    }
                    b"c" => {
                        current_col += 1;
                        cell_type = None;
                        cell_style = None;
                        cell_value = None;

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => {
                                    let cell_ref = String::from_utf8_lossy(&attr.value);
                                    if let Some((row, col)) = parse_cell_ref(&cell_ref) {
                                        current_row = row;
                                        current_col = col;
                                    }
                                }
                                b"t" => {
                                    cell_type =
                                        Some(String::from_utf8_lossy(&attr.value).to_string());
                                }
                                b"s" => {
                                    cell_style =
                                        String::from_utf8_lossy(&attr.value).parse().ok();
                                }
                                _ => {}
                            }
                        }
                        cell_pos = Some((current_row, current_col));
                    }
                    b"v" | b"t" if cell_pos.is_some() => {
                        in_value = true;
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::Empty(ref e)) => {
                    // A self-closing <c/> is a blank cell entry; it still
                    // extends the used range.
                    if e.name().as_ref() == b"c" {
                        current_col += 1;
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"r" {
                                let cell_ref = String::from_utf8_lossy(&attr.value);
                                if let Some((row, col)) = parse_cell_ref(&cell_ref) {
                                    current_row = row;
                                    current_col = col;
                                }
                            }
                        }
                        sheet.insert(
                            current_row,
                            current_col,
                            Cell {
                                kind: CellKind::Blank,
                                raw: String::new(),
                            },
                        );
                    }
                }
                Ok(quick_xml::events::Event::Text(ref e)) => {
                    if in_value {
                        let text = e.unescape().unwrap_or_default();
                        cell_value.get_or_insert_with(String::new).push_str(&text);
                    }
                }
                Ok(quick_xml::events::Event::End(ref e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some((row, col)) = cell_pos.take() {
                            let cell = build_cell(
                                cell_type.as_deref(),
                                cell_style,
                                cell_value.take(),
                                shared_strings,
                                styles,
                            );
                            sheet.insert(row, col, cell);
                        }
                    }
                    b"v" | b"t" => in_value = false,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheet)
    }
}

/// Classify and resolve a finalized cell.
fn build_cell(
    cell_type: Option<&str>,
    style: Option<usize>,
    value: Option<String>,
    shared_strings: &SharedStrings,
    styles: &Styles,
) -> Cell {
    let Some(value) = value else {
        return Cell {
            kind: CellKind::Blank,
            raw: String::new(),
        };
    };

    match cell_type {
        Some("s") => {
            let resolved = value
                .parse::<usize>()
                .ok()
                .and_then(|idx| shared_strings.get(idx))
                .unwrap_or("")
                .to_string();
            Cell {
                kind: CellKind::Text,
                raw: resolved,
            }
        }
        Some("str") | Some("inlineStr") => Cell {
            kind: CellKind::Text,
            raw: value,
        },
        Some("b") => Cell {
            kind: CellKind::Boolean,
            raw: value,
        },
        Some("e") => Cell {
            kind: CellKind::Error,
            raw: value,
        },
        Some("d") => Cell {
            kind: CellKind::DateTime,
            raw: value,
        },
        _ => {
            // Plain number unless the style says date or elapsed time
            let num_fmt = style.and_then(|s| styles.num_fmt_id(s));
            let kind = match num_fmt {
                Some(id) if styles.is_duration_format(id) => CellKind::Duration,
                Some(id) if styles.is_date_format(id) => CellKind::DateTime,
                _ => CellKind::Number,
            };
            Cell { kind, raw: value }
        }
    }
}

/// Parse a cell reference like `B12` into 1-based (row, column).
fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let split = cell_ref.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell_ref.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let row = digits.parse().ok()?;
    Some((row, column_to_number(letters)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn parse_sheet(xml: &str) -> Worksheet {
        Worksheet::parse("Test", xml, &SharedStrings::default(), &Styles::default()).unwrap()
    }

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <sheetData>
        <row r="2">
            <c r="B2" t="inlineStr"><is><t>Name</t></is></c>
            <c r="C2"><v>30</v></c>
            <c r="D2" t="b"><v>1</v></c>
        </row>
        <row r="4">
            <c r="B4"/>
            <c r="C4" t="e"><v>#DIV/0!</v></c>
        </row>
    </sheetData>
</worksheet>"#;

    #[test]
    fn test_parse_grid() {
        let sheet = parse_sheet(SHEET);

        assert_eq!(sheet.name(), "Test");
        assert_eq!(sheet.used_rows(), Some((2, 4)));
        assert_eq!(sheet.used_columns(), Some((2, 4)));

        assert_eq!(sheet.value(2, 2), CellValue::Text("Name".to_string()));
        assert_eq!(sheet.value(2, 3), CellValue::Number(30.0));
        assert_eq!(sheet.value(2, 4), CellValue::Bool(true));
        // Blank entry, error cell, absent cell: all null
        assert_eq!(sheet.value(4, 2), CellValue::Null);
        assert_eq!(sheet.value(4, 3), CellValue::Null);
        assert_eq!(sheet.value(1, 1), CellValue::Null);
    }

    #[test]
    fn test_cell_text() {
        let sheet = parse_sheet(SHEET);
        assert_eq!(sheet.cell_text(2, 2), "Name");
        assert_eq!(sheet.cell_text(2, 3), "30");
        assert_eq!(sheet.cell_text(2, 4), "TRUE");
        assert_eq!(sheet.cell_text(9, 9), "");
    }

    #[test]
    fn test_cells_without_refs_follow_sequentially() {
        let xml = r#"<worksheet><sheetData>
            <row><c><v>1</v></c><c><v>2</v></c></row>
            <row><c><v>3</v></c></row>
        </sheetData></worksheet>"#;
        let sheet = parse_sheet(xml);

        assert_eq!(sheet.value(1, 1), CellValue::Number(1.0));
        assert_eq!(sheet.value(1, 2), CellValue::Number(2.0));
        assert_eq!(sheet.value(2, 1), CellValue::Number(3.0));
    }

    #[test]
    fn test_shared_string_resolution() {
        let ss = SharedStrings::parse(
            r#"<sst><si><t>Hello</t></si></sst>"#,
        )
        .unwrap();
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>7</v></c></row>
        </sheetData></worksheet>"#;
        let sheet = Worksheet::parse("Test", xml, &ss, &Styles::default()).unwrap();

        assert_eq!(sheet.value(1, 1), CellValue::Text("Hello".to_string()));
        // Out-of-range shared string index resolves to the empty string
        assert_eq!(sheet.value(1, 2), CellValue::Text(String::new()));
    }

    #[test]
    fn test_date_and_duration_styles() {
        let styles = Styles::parse(
            r#"<styleSheet>
                <cellXfs count="3"><xf numFmtId="0"/><xf numFmtId="14"/><xf numFmtId="46"/></cellXfs>
            </styleSheet>"#,
        );
        let xml = r#"<worksheet><sheetData>
            <row r="1">
                <c r="A1" s="0"><v>44197</v></c>
                <c r="B1" s="1"><v>44197</v></c>
                <c r="C1" s="2"><v>1.5</v></c>
            </row>
        </sheetData></worksheet>"#;
        let sheet = Worksheet::parse("Test", xml, &SharedStrings::default(), &styles).unwrap();

        assert_eq!(sheet.value(1, 1), CellValue::Number(44197.0));
        assert!(matches!(sheet.value(1, 2), CellValue::DateTime(_)));
        assert_eq!(
            sheet.value(1, 3),
            CellValue::Duration(Duration::hours(36))
        );
    }

    #[test]
    fn test_coercion_is_total() {
        // Unparseable payloads degrade to null instead of erroring
        let bad_number = Cell {
            kind: CellKind::Number,
            raw: "not-a-number".to_string(),
        };
        assert_eq!(bad_number.coerce(), CellValue::Null);

        let bad_date = Cell {
            kind: CellKind::DateTime,
            raw: "eventually".to_string(),
        };
        assert_eq!(bad_date.coerce(), CellValue::Null);

        let iso_date = Cell {
            kind: CellKind::DateTime,
            raw: "2021-01-01".to_string(),
        };
        assert!(matches!(iso_date.coerce(), CellValue::DateTime(_)));

        assert_eq!(coerce_cell(None), CellValue::Null);
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some((1, 1)));
        assert_eq!(parse_cell_ref("B12"), Some((12, 2)));
        assert_eq!(parse_cell_ref("AA3"), Some((3, 27)));
        assert_eq!(parse_cell_ref("42"), None);
        assert_eq!(parse_cell_ref(""), None);
    }
}
