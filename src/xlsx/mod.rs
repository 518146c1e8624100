//! XLSX workbook parsing.
//!
//! A [`Workbook`] buffers the whole archive, reads the sheet registry from
//! `xl/workbook.xml`, and parses individual worksheets on demand.
//!
//! # Example
//!
//! ```no_run
//! use unsheet::Workbook;
//!
//! let workbook = Workbook::open("data.xlsx")?;
//! for name in workbook.sheet_names() {
//!     println!("Sheet: {}", name);
//! }
//! let sheet = workbook.worksheet("Data")?;
//! # Ok::<(), unsheet::Error>(())
//! ```

mod sheet;
mod shared_strings;
mod styles;

pub use sheet::{coerce_cell, Cell, CellKind, Worksheet};
pub use shared_strings::SharedStrings;
pub use styles::Styles;

use crate::container::XlsxContainer;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

/// Sheet registry entry from xl/workbook.xml.
#[derive(Debug, Clone)]
struct SheetInfo {
    name: String,
    rel_id: String,
}

/// An opened XLSX workbook.
///
/// Owns the underlying buffer for its whole lifetime; dropping the workbook
/// releases it.
pub struct Workbook {
    container: XlsxContainer,
    shared_strings: SharedStrings,
    styles: Styles,
    sheets: Vec<SheetInfo>,
    relationships: HashMap<String, String>,
}

impl Workbook {
    /// Open a workbook from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_container(XlsxContainer::open(path)?)
    }

    /// Open a workbook from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_container(XlsxContainer::from_bytes(data)?)
    }

    /// Open a workbook from a reader, buffering its contents.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_container(XlsxContainer::from_reader(reader)?)
    }

    fn from_container(container: XlsxContainer) -> Result<Self> {
        // workbook.xml is the one required part; its absence means the
        // archive is not a workbook
        let workbook_xml = container.read_xml("xl/workbook.xml")?;
        let sheets = parse_workbook(&workbook_xml)?;

        let relationships = match container.read_xml("xl/_rels/workbook.xml.rels") {
            Ok(xml) => parse_workbook_rels(&xml)?,
            Err(_) => HashMap::new(),
        };

        let shared_strings = match container.read_xml("xl/sharedStrings.xml") {
            Ok(xml) => SharedStrings::parse(&xml)?,
            Err(_) => SharedStrings::default(),
        };

        let styles = match container.read_xml("xl/styles.xml") {
            Ok(xml) => Styles::parse(&xml),
            Err(_) => Styles::default(),
        };

        tracing::debug!(sheets = sheets.len(), "opened workbook");

        Ok(Self {
            container,
            shared_strings,
            styles,
            sheets,
            relationships,
        })
    }

    /// Names of all worksheets, in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Whether the workbook contains a worksheet with this name.
    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.iter().any(|s| s.name == name)
    }

    /// Parse a worksheet by name.
    pub fn worksheet(&self, name: &str) -> Result<Worksheet> {
        let info = self
            .sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))?;

        let target = self
            .relationships
            .get(&info.rel_id)
            .ok_or_else(|| Error::MissingComponent(format!("worksheet part for '{}'", name)))?;

        let sheet_path = match target.strip_prefix('/') {
            Some(stripped) => stripped.to_string(),
            None => format!("xl/{}", target),
        };

        let xml = self.container.read_xml(&sheet_path)?;
        Worksheet::parse(name, &xml, &self.shared_strings, &self.styles)
    }
}

impl std::fmt::Debug for Workbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbook")
            .field("sheets", &self.sheet_names())
            .finish()
    }
}

/// Parse xl/workbook.xml for the sheet registry.
fn parse_workbook(xml: &str) -> Result<Vec<SheetInfo>> {
    let mut sheets = Vec::new();
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Empty(e)) | Ok(quick_xml::events::Event::Start(e)) => {
                if e.name().as_ref() == b"sheet" {
                    let mut name = String::new();
                    let mut rel_id = String::new();

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => name = String::from_utf8_lossy(&attr.value).to_string(),
                            b"r:id" => rel_id = String::from_utf8_lossy(&attr.value).to_string(),
                            _ => {}
                        }
                    }

                    if !name.is_empty() {
                        sheets.push(SheetInfo { name, rel_id });
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

/// Parse xl/_rels/workbook.xml.rels into an id -> target map.
fn parse_workbook_rels(xml: &str) -> Result<HashMap<String, String>> {
    let mut rels = HashMap::new();
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Empty(e)) | Ok(quick_xml::events::Event::Start(e)) => {
                if e.name().as_ref() == b"Relationship" {
                    let mut id = String::new();
                    let mut target = String::new();

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                            _ => {}
                        }
                    }

                    if !id.is_empty() && !target.is_empty() {
                        rels.insert(id, target);
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

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

    fn minimal_workbook() -> Vec<u8> {
        zip_with(&[
            (
                "xl/workbook.xml",
                r#"<workbook><sheets>
                    <sheet name="Data" sheetId="1" r:id="rId1"/>
                    <sheet name="Second" sheetId="2" r:id="rId2"/>
                </sheets></workbook>"#,
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<Relationships>
                    <Relationship Id="rId1" Target="worksheets/sheet1.xml"/>
                    <Relationship Id="rId2" Target="worksheets/sheet2.xml"/>
                </Relationships>"#,
            ),
            (
                "xl/worksheets/sheet1.xml",
                r#"<worksheet><sheetData>
                    <row r="1"><c r="A1"><v>1</v></c></row>
                </sheetData></worksheet>"#,
            ),
            (
                "xl/worksheets/sheet2.xml",
                r#"<worksheet><sheetData/></worksheet>"#,
            ),
        ])
    }

    #[test]
    fn test_open_and_list_sheets() {
        let workbook = Workbook::from_bytes(minimal_workbook()).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Data", "Second"]);
        assert!(workbook.has_sheet("Data"));
        assert!(!workbook.has_sheet("Missing"));
    }

    #[test]
    fn test_worksheet_lookup() {
        let workbook = Workbook::from_bytes(minimal_workbook()).unwrap();

        let sheet = workbook.worksheet("Data").unwrap();
        assert_eq!(sheet.used_rows(), Some((1, 1)));

        let empty = workbook.worksheet("Second").unwrap();
        assert_eq!(empty.used_rows(), None);

        assert!(matches!(
            workbook.worksheet("Missing"),
            Err(Error::SheetNotFound(_))
        ));
    }

    #[test]
    fn test_missing_workbook_part() {
        let data = zip_with(&[("other.xml", "<a/>")]);
        assert!(matches!(
            Workbook::from_bytes(data),
            Err(Error::MissingComponent(_))
        ));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            Workbook::from_bytes(b"plain text".to_vec()),
            Err(Error::ZipArchive(_))
        ));
    }
}
