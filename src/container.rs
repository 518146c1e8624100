//! ZIP container abstraction for XLSX workbooks.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

/// ZIP container over a fully-buffered workbook.
///
/// The whole archive is held in memory for the lifetime of the container;
/// dropping it releases the buffer. Parts are read on demand as decoded
/// XML strings.
pub struct XlsxContainer {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl XlsxContainer {
    /// Open a container from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Create a container from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let cursor = Cursor::new(data);
        let archive = zip::ZipArchive::new(cursor)?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Create a container from a reader, buffering its contents.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Read an XML part from the archive as a string.
    ///
    /// Handles UTF-8 (with or without BOM) and UTF-16 LE/BE with BOM.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        decode_xml_bytes(&bytes)
    }

    /// Check if a part exists in the archive.
    pub fn exists(&self, path: &str) -> bool {
        self.archive.borrow().file_names().any(|n| n == path)
    }
}

impl std::fmt::Debug for XlsxContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let files = self.archive.borrow().len();
        f.debug_struct("XlsxContainer").field("files", &files).finish()
    }
}

/// Decode XML bytes, detecting the encoding from a BOM when present.
pub(crate) fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8(rest.to_vec())
            .map_err(|e| Error::InvalidData(e.to_string()));
    }

    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        let content = decode_utf16(rest, u16::from_le_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let content = decode_utf16(rest, u16::from_be_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        Err(_) => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn decode_utf16(bytes: &[u8], from_bytes: fn([u8; 2]) -> u16) -> Result<String> {
    // Truncate to an even number of bytes
    let len = bytes.len() & !1;
    let units = (0..len).step_by(2).map(|i| from_bytes([bytes[i], bytes[i + 1]]));

    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::InvalidData(e.to_string()))
}

/// Rewrite an `encoding="UTF-16"` XML declaration to UTF-8.
///
/// After decoding UTF-16 bytes to a Rust string the declaration still names
/// UTF-16, which makes quick-xml reinterpret the already-decoded content.
fn fix_xml_encoding_declaration(content: &str) -> String {
    if content.starts_with("<?xml") {
        if let Some(end_decl) = content.find("?>") {
            let decl = &content[..end_decl + 2];
            let rest = &content[end_decl + 2..];

            let fixed_decl = decl
                .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='UTF-16'", "encoding='UTF-8'")
                .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='utf-16'", "encoding='UTF-8'");

            return format!("{}{}", fixed_decl, rest);
        }
    }
    content.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn zip_with(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_read_part() {
        let data = zip_with(&[("xl/workbook.xml", "<workbook/>")]);
        let container = XlsxContainer::from_bytes(data).unwrap();

        assert!(container.exists("xl/workbook.xml"));
        assert!(!container.exists("xl/styles.xml"));
        assert_eq!(container.read_xml("xl/workbook.xml").unwrap(), "<workbook/>");
        assert!(matches!(
            container.read_xml("missing.xml"),
            Err(Error::MissingComponent(_))
        ));
    }

    #[test]
    fn test_reject_non_zip() {
        let result = XlsxContainer::from_bytes(b"not a zip archive".to_vec());
        assert!(matches!(result, Err(Error::ZipArchive(_))));
    }

    #[test]
    fn test_decode_utf16() {
        let utf16_le = b"\xFF\xFE<\0?\0x\0m\0l\0>\0";
        assert_eq!(decode_xml_bytes(utf16_le).unwrap(), "<?xml>");

        let utf16_be = b"\xFE\xFF\0<\0?\0x\0m\0l\0>";
        assert_eq!(decode_xml_bytes(utf16_be).unwrap(), "<?xml>");

        let utf8_bom = b"\xEF\xBB\xBF<?xml>";
        assert_eq!(decode_xml_bytes(utf8_bom).unwrap(), "<?xml>");

        let utf8_plain = b"<?xml>";
        assert_eq!(decode_xml_bytes(utf8_plain).unwrap(), "<?xml>");
    }

    #[test]
    fn test_fix_encoding_declaration() {
        let fixed = fix_xml_encoding_declaration("<?xml version=\"1.0\" encoding=\"UTF-16\"?><a/>");
        assert_eq!(fixed, "<?xml version=\"1.0\" encoding=\"UTF-8\"?><a/>");
    }
}
