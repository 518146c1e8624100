//! Number-format classification from xl/styles.xml.
//!
//! Numeric cells carry a style index (`s` attribute) into `cellXfs`; the
//! referenced number format decides whether the cell holds a plain number,
//! a date-time, or an elapsed duration.

use std::collections::HashMap;

/// Styles information parsed from xl/styles.xml.
#[derive(Debug, Default)]
pub struct Styles {
    /// Custom number formats: numFmtId -> formatCode
    num_fmts: HashMap<u32, String>,
    /// Cell style formats: style index -> numFmtId
    cell_xfs: Vec<u32>,
}

impl Styles {
    /// Parse styles from xl/styles.xml content.
    pub fn parse(xml: &str) -> Self {
        let mut styles = Self::default();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut in_num_fmts = false;
        let mut in_cell_xfs = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e))
                | Ok(quick_xml::events::Event::Empty(ref e)) => match e.name().as_ref() {
                    b"numFmts" => in_num_fmts = true,
                    b"cellXfs" => in_cell_xfs = true,
                    b"numFmt" if in_num_fmts => {
                        let mut num_fmt_id: Option<u32> = None;
                        let mut format_code = String::new();
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"numFmtId" => {
                                    num_fmt_id = String::from_utf8_lossy(&attr.value).parse().ok();
                                }
                                b"formatCode" => {
                                    format_code = String::from_utf8_lossy(&attr.value).to_string();
                                }
                                _ => {}
                            }
                        }
                        if let Some(id) = num_fmt_id {
                            styles.num_fmts.insert(id, format_code);
                        }
                    }
                    b"xf" if in_cell_xfs => {
                        let mut num_fmt_id: u32 = 0;
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"numFmtId" {
                                if let Ok(id) = String::from_utf8_lossy(&attr.value).parse() {
                                    num_fmt_id = id;
                                }
                            }
                        }
                        styles.cell_xfs.push(num_fmt_id);
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::End(ref e)) => match e.name().as_ref() {
                    b"numFmts" => in_num_fmts = false,
                    b"cellXfs" => in_cell_xfs = false,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(_) => break,
                _ => {}
            }
            buf.clear();
        }

        styles
    }

    /// Get the numFmtId for a cell style index.
    pub fn num_fmt_id(&self, style_index: usize) -> Option<u32> {
        self.cell_xfs.get(style_index).copied()
    }

    /// Check if a numFmtId represents a date or date-time format.
    pub fn is_date_format(&self, num_fmt_id: u32) -> bool {
        // Built-in formats: 14-22 dates, 45 and 47 times
        if (14..=22).contains(&num_fmt_id) || num_fmt_id == 45 || num_fmt_id == 47 {
            return true;
        }

        self.num_fmts
            .get(&num_fmt_id)
            .is_some_and(|code| is_date_format_code(code))
    }

    /// Check if a numFmtId represents an elapsed-time (duration) format.
    ///
    /// Elapsed time is written with bracketed tokens like `[h]:mm:ss`;
    /// builtin 46 is the bracketed variant.
    pub fn is_duration_format(&self, num_fmt_id: u32) -> bool {
        if num_fmt_id == 46 {
            return true;
        }

        self.num_fmts
            .get(&num_fmt_id)
            .is_some_and(|code| is_duration_format_code(code))
    }
}

/// Check if a format code string represents a date format.
///
/// Date tokens (d, y, and m in a date context) count only outside quoted
/// literals and bracketed sections like `[Red]`.
fn is_date_format_code(format_code: &str) -> bool {
    let mut in_bracket = false;
    let mut in_quote = false;
    let mut prev_char = '\0';

    for c in format_code.chars() {
        match c {
            '[' if !in_quote => in_bracket = true,
            ']' if !in_quote => in_bracket = false,
            '"' => in_quote = !in_quote,
            _ if !in_bracket && !in_quote => match c.to_ascii_lowercase() {
                'd' | 'y' => return true,
                'm' => {
                    // Month rather than minute when day/year context exists
                    let prev = prev_char.to_ascii_lowercase();
                    if prev == 'd' || prev == 'y' {
                        return true;
                    }
                    let lower = format_code.to_lowercase();
                    if lower.contains('d') || lower.contains('y') {
                        return true;
                    }
                }
                _ => {}
            },
            _ => {}
        }
        prev_char = c;
    }

    false
}

/// Check if a format code string uses elapsed-time brackets.
fn is_duration_format_code(format_code: &str) -> bool {
    let mut in_quote = false;
    let mut chars = format_code.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => in_quote = !in_quote,
            '[' if !in_quote => {
                if let Some(next) = chars.peek() {
                    if matches!(next.to_ascii_lowercase(), 'h' | 'm' | 's') {
                        return true;
                    }
                }
            }
            _ => {}
        }
    }

    false
}
