//! Typed cell values and Excel serial-number conversions.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::ser::Serializer;
use serde::Serialize;

/// A coerced cell value.
///
/// Chosen by the source cell's declared kind; unrecognized kinds and
/// unparseable payloads degrade to [`CellValue::Null`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Blank, error, or otherwise valueless cell.
    Null,
    /// Boolean cell.
    Bool(bool),
    /// Date or date-time cell.
    DateTime(NaiveDateTime),
    /// Elapsed-time cell.
    Duration(Duration),
    /// Numeric cell.
    Number(f64),
    /// Textual cell.
    Text(String),
}

impl CellValue {
    /// Whether this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(true) => write!(f, "TRUE"),
            CellValue::Bool(false) => write!(f, "FALSE"),
            CellValue::DateTime(dt) => {
                if dt.time() == NaiveTime::MIN {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S"))
                }
            }
            CellValue::Duration(d) => {
                let total = d.num_seconds();
                let sign = if total < 0 { "-" } else { "" };
                let total = total.abs();
                write!(f, "{}{}:{:02}:{:02}", sign, total / 3600, (total % 3600) / 60, total % 60)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_unit(),
            CellValue::Bool(v) => serializer.serialize_bool(*v),
            CellValue::DateTime(dt) => {
                serializer.collect_str(&dt.format("%Y-%m-%dT%H:%M:%S"))
            }
            CellValue::Duration(d) => serializer.serialize_i64(d.num_seconds()),
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Convert an Excel serial date number to a date-time.
///
/// Day 1 is 1900-01-01. Serials above 60 are shifted down by one to absorb
/// the nonexistent 1900-02-29 that Excel inherits from Lotus 1-2-3.
/// Serials below 1 (time-only fractions, negatives) yield `None`.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }

    let adjusted = if serial > 60.0 { serial - 1.0 } else { serial };
    let days = adjusted.floor() as i64;

    let date = NaiveDate::from_ymd_opt(1899, 12, 31)?
        .checked_add_signed(Duration::days(days))?;

    let seconds = (serial.fract() * 86_400.0).round() as i64;
    date.and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::seconds(seconds))
}

/// Convert an Excel serial number (in days) to an elapsed duration,
/// rounded to whole seconds.
pub fn serial_to_duration(serial: f64) -> Option<Duration> {
    if !serial.is_finite() {
        return None;
    }
    let seconds = (serial * 86_400.0).round() as i64;
    Some(Duration::seconds(seconds))
}
