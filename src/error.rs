//! Error types for the unsheet library.

use std::io;
use thiserror::Error;

/// Result type alias for unsheet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while opening a workbook or extracting sheets.
///
/// Open-level failures ([`Error::Io`], [`Error::ZipArchive`], a missing
/// `xl/workbook.xml`) abort the whole extraction; everything else is caught
/// at the per-worksheet boundary and collected as an error string.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading the ZIP container.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A required workbook part is missing from the archive.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// A requested worksheet does not exist in the workbook.
    #[error("Worksheet '{0}' not found in workbook")]
    SheetNotFound(String),

    /// A column range string is malformed.
    #[error("Invalid column range: {0}")]
    ColumnRange(String),

    /// Invalid or malformed data in the workbook.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::SheetNotFound("Data".to_string());
        assert_eq!(err.to_string(), "Worksheet 'Data' not found in workbook");

        let err = Error::ColumnRange("A:B:C".to_string());
        assert_eq!(err.to_string(), "Invalid column range: A:B:C");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
